//! Event bus: same-process, synchronous-dispatch publish/subscribe.
//!
//! The bus replaces the browser original's ambient `window` events with an
//! explicit object constructed once per process and passed by reference to
//! consumers. Dispatch is synchronous and in registration order; there is no
//! queuing and no delivery guarantee beyond the current process lifetime.
//!
//! Handlers must be idempotent and tolerate stale backing data: they should
//! re-derive truth from their own source rather than trust event payloads,
//! except where a payload is documented as authoritative (the unread count
//! push).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use agrichain_core::{Channel, DomainEvent};

type Handler = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

/// Publish/subscribe bus keyed by [`Channel`].
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

struct Subscriber {
    id: u64,
    channel: Channel,
    handler: Handler,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events on `channel`.
    ///
    /// Returns a guard that unsubscribes when dropped; hold it for as long
    /// as delivery is wanted.
    #[must_use]
    pub fn subscribe(
        &self,
        channel: Channel,
        handler: impl Fn(&DomainEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.push(Subscriber {
                id,
                channel,
                handler: Arc::new(handler),
            });
        }
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Dispatch `event` to every current subscriber of its channel, in
    /// registration order, synchronously: all handlers have run by the time
    /// this returns.
    pub fn publish(&self, event: &DomainEvent) {
        // Snapshot the matching handlers outside the lock so a handler may
        // publish or subscribe re-entrantly without deadlock. A handler
        // registered mid-publish sees only subsequent events.
        let matching: Vec<Handler> = match self.inner.subscribers.lock() {
            Ok(subscribers) => subscribers
                .iter()
                .filter(|s| s.channel == event.channel())
                .map(|s| Arc::clone(&s.handler))
                .collect(),
            Err(_) => return,
        };
        debug!(channel = %event.channel(), subscribers = matching.len(), "publishing event");
        for handler in matching {
            handler(event);
        }
    }
}

/// Guard for a registered handler; unsubscribes on drop.
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Unsubscribe now instead of at drop time.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade()
            && let Ok(mut subscribers) = inner.subscribers.lock()
        {
            subscribers.retain(|s| s.id != self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_two_subscribers_invoked_once_each_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = bus.subscribe(Channel::CartUpdated, move |_| {
            first.lock().unwrap().push("first");
        });
        let second = Arc::clone(&order);
        let _b = bus.subscribe(Channel::CartUpdated, move |_| {
            second.lock().unwrap().push("second");
        });

        bus.publish(&DomainEvent::CartUpdated);

        // Dispatch is synchronous: both ran before publish returned.
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_channels_are_isolated() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(Channel::NotificationUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        bus.publish(&DomainEvent::CartUpdated);
        assert_eq!(*hits.lock().unwrap(), 0);

        bus.publish(&DomainEvent::NotificationUpdated { count: None });
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        let sub = bus.subscribe(Channel::CartUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        bus.publish(&DomainEvent::CartUpdated);
        sub.unsubscribe();
        bus.publish(&DomainEvent::CartUpdated);

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_handler_may_publish_reentrantly() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&hits);
        let _notified = bus.subscribe(Channel::NotificationUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        let chained = bus.clone();
        let _cart = bus.subscribe(Channel::CartUpdated, move |_| {
            chained.publish(&DomainEvent::NotificationUpdated { count: None });
        });

        bus.publish(&DomainEvent::CartUpdated);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_payload_reaches_handler() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let _sub = bus.subscribe(Channel::NotificationUpdated, move |event| {
            if let DomainEvent::NotificationUpdated { count } = event {
                *slot.lock().unwrap() = *count;
            }
        });

        bus.publish(&DomainEvent::NotificationUpdated { count: Some(5) });
        assert_eq!(*seen.lock().unwrap(), Some(5));
    }
}
