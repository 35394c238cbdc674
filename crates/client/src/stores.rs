//! Synchronization stores: the fetch-mirror-publish cycle.
//!
//! The stores sit between the feature modules and the UI. A mutation flows
//! as: single network round trip -> authoritative re-fetch -> mirror into
//! the local store -> one event on the bus. Failures propagate without
//! touching the mirror or the bus (no partial apply), so the worst case is
//! a stale badge, never inconsistent state.
//!
//! # Ordering
//!
//! The browser original let overlapping mutations race, last-response-wins.
//! Here every mutation takes a monotonic sequence ticket before its round
//! trip; a re-fetch that completes after a younger ticket has already been
//! applied is discarded instead of clobbering newer state. Within one call
//! site the publish still always happens after that mutation's response
//! resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, warn};

use agrichain_core::{CartSnapshot, Channel, DomainEvent, ProductId, StoreKey, UserId};

use crate::bus::{EventBus, Subscription};
use crate::error::ApiResult;
use crate::modules::cart::CartApi;
use crate::modules::notifications::NotificationApi;
use crate::store::LocalStore;

// =============================================================================
// CartStore
// =============================================================================

/// Keeps the cart badge and every cart view consistent: owns the local
/// mirror under [`StoreKey::Cart`] and the `cart-updated` publish decision.
#[derive(Clone)]
pub struct CartStore {
    api: CartApi,
    store: LocalStore,
    bus: EventBus,
    /// Next mutation ticket; taken before the round trip starts.
    tickets: Arc<AtomicU64>,
    /// Highest ticket whose snapshot has been applied.
    applied: Arc<Mutex<u64>>,
}

impl CartStore {
    /// Create a cart store over the cart API, local store, and bus.
    #[must_use]
    pub fn new(api: CartApi, store: LocalStore, bus: EventBus) -> Self {
        Self {
            api,
            store,
            bus,
            tickets: Arc::new(AtomicU64::new(1)),
            applied: Arc::new(Mutex::new(0)),
        }
    }

    /// The mirrored snapshot, without a network round trip. Empty when
    /// nothing has been mirrored yet.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        self.store.read(&StoreKey::Cart, CartSnapshot::empty())
    }

    /// Add a product to the cart, then re-fetch, mirror, and publish.
    ///
    /// # Errors
    ///
    /// Any gateway error; on failure nothing is mirrored and nothing is
    /// published.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<CartSnapshot> {
        let ticket = self.take_ticket();
        self.api.add_item(user_id, product_id, quantity).await?;
        self.refetch_and_apply(user_id, ticket).await
    }

    /// Set a line's quantity to an absolute value, then re-fetch, mirror,
    /// and publish.
    ///
    /// # Errors
    ///
    /// Any gateway error; on failure nothing is mirrored and nothing is
    /// published.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<CartSnapshot> {
        let ticket = self.take_ticket();
        self.api.update_item(user_id, product_id, quantity).await?;
        self.refetch_and_apply(user_id, ticket).await
    }

    /// Remove a product's line, then re-fetch, mirror, and publish.
    ///
    /// # Errors
    ///
    /// Any gateway error; on failure nothing is mirrored and nothing is
    /// published.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> ApiResult<CartSnapshot> {
        let ticket = self.take_ticket();
        self.api.remove_item(user_id, product_id).await?;
        self.refetch_and_apply(user_id, ticket).await
    }

    /// Authoritative re-fetch without a preceding mutation (page load,
    /// `cart-updated` received from elsewhere).
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn refresh(&self, user_id: UserId) -> ApiResult<CartSnapshot> {
        let ticket = self.take_ticket();
        self.refetch_and_apply(user_id, ticket).await
    }

    /// Drop the local mirror (logout) and tell views to re-derive.
    pub fn clear(&self) {
        self.store.remove(&StoreKey::Cart);
        self.bus.publish(&DomainEvent::CartUpdated);
    }

    fn take_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst)
    }

    async fn refetch_and_apply(&self, user_id: UserId, ticket: u64) -> ApiResult<CartSnapshot> {
        let snapshot = self.api.fetch(user_id).await?;
        Ok(self.apply(ticket, snapshot))
    }

    /// Apply a fetched snapshot unless a younger ticket already has. Returns
    /// the snapshot now in effect.
    fn apply(&self, ticket: u64, snapshot: CartSnapshot) -> CartSnapshot {
        {
            let Ok(mut applied) = self.applied.lock() else {
                return snapshot;
            };
            if ticket < *applied {
                debug!(ticket, applied = *applied, "discarding stale cart response");
                return self.current();
            }
            *applied = ticket;
        }
        if let Err(e) = snapshot.validate() {
            // The backend is authoritative even when it breaks its own
            // contract; keep the data but make the violation visible.
            warn!(error = %e, "cart snapshot violates line invariants");
        }
        self.store.write(&StoreKey::Cart, &snapshot);
        self.bus.publish(&DomainEvent::CartUpdated);
        snapshot
    }
}

// =============================================================================
// NotificationStore
// =============================================================================

/// Holds the unread badge count. Two writers, both last-write-wins:
/// authoritative fetches via [`refresh`](Self::refresh), and realtime pushes
/// arriving as `notification-updated` events with a literal count (never an
/// increment).
pub struct NotificationStore {
    api: NotificationApi,
    bus: EventBus,
    count: Arc<Mutex<u32>>,
    /// Keeps the push subscription alive for the store's lifetime.
    _push: Subscription,
}

impl NotificationStore {
    /// Create a notification store and subscribe it to push updates.
    #[must_use]
    pub fn new(api: NotificationApi, bus: EventBus) -> Self {
        let count = Arc::new(Mutex::new(0));
        let slot = Arc::clone(&count);
        let push = bus.subscribe(Channel::NotificationUpdated, move |event| {
            // A push with an explicit count overwrites; a bare event leaves
            // the count for the next authoritative fetch.
            if let DomainEvent::NotificationUpdated { count: Some(n) } = event
                && let Ok(mut current) = slot.lock()
            {
                *current = *n;
            }
        });
        Self {
            api,
            bus,
            count,
            _push: push,
        }
    }

    /// The displayed count.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.count.lock().map_or(0, |guard| *guard)
    }

    /// Authoritative fetch; overwrites the count and republishes it.
    ///
    /// # Errors
    ///
    /// Any gateway error; on failure the count is left unchanged.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn refresh(&self, user_id: UserId) -> ApiResult<u32> {
        let n = self.api.unread_count(user_id).await?;
        if let Ok(mut current) = self.count.lock() {
            *current = n;
        }
        self.bus
            .publish(&DomainEvent::NotificationUpdated { count: Some(n) });
        Ok(n)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::config::MarketConfig;
    use crate::gateway::Gateway;

    fn fixture() -> (tempfile::TempDir, CartStore, EventBus) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let bus = EventBus::new();
        let gateway = Gateway::new(reqwest::Client::new(), &MarketConfig::default());
        let cart = CartStore::new(CartApi::new(gateway), store, bus.clone());
        (dir, cart, bus)
    }

    fn snapshot_of(quantity: u32) -> CartSnapshot {
        CartSnapshot {
            lines: vec![agrichain_core::CartLine {
                product_id: ProductId::new(1),
                quantity,
                unit_price: rust_decimal::Decimal::new(100, 2),
                sale_price: None,
            }],
        }
    }

    #[test]
    fn test_apply_in_order_mirrors_and_publishes() {
        let (_dir, cart, bus) = fixture();
        let published = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe(Channel::CartUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        cart.apply(1, snapshot_of(2));
        cart.apply(2, snapshot_of(3));

        assert_eq!(cart.current().item_count(), 3);
        assert_eq!(*published.lock().unwrap(), 2);
    }

    #[test]
    fn test_stale_ticket_discarded_without_publish() {
        let (_dir, cart, bus) = fixture();
        let published = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe(Channel::CartUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        // Ticket 2's response lands first; ticket 1's arrives late.
        let effective = cart.apply(2, snapshot_of(5));
        assert_eq!(effective.item_count(), 5);
        let after_stale = cart.apply(1, snapshot_of(9));

        // The stale snapshot neither sticks nor republishes.
        assert_eq!(after_stale.item_count(), 5);
        assert_eq!(cart.current().item_count(), 5);
        assert_eq!(*published.lock().unwrap(), 1);
    }

    #[test]
    fn test_clear_drops_mirror_and_publishes() {
        let (_dir, cart, bus) = fixture();
        cart.apply(1, snapshot_of(4));

        let published = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&published);
        let _sub = bus.subscribe(Channel::CartUpdated, move |_| {
            *counter.lock().unwrap() += 1;
        });

        cart.clear();
        assert!(cart.current().is_empty());
        assert_eq!(*published.lock().unwrap(), 1);
    }

    #[test]
    fn test_push_with_count_overwrites_displayed_count() {
        let bus = EventBus::new();
        let gateway = Gateway::new(reqwest::Client::new(), &MarketConfig::default());
        let notifications = NotificationStore::new(NotificationApi::new(gateway), bus.clone());

        // Displayed count is 2; a push carrying 5 arrives.
        bus.publish(&DomainEvent::NotificationUpdated { count: Some(2) });
        assert_eq!(notifications.current(), 2);
        bus.publish(&DomainEvent::NotificationUpdated { count: Some(5) });

        // Overwrite, not accumulate: exactly 5, never 7.
        assert_eq!(notifications.current(), 5);
    }

    #[test]
    fn test_bare_push_leaves_count_untouched() {
        let bus = EventBus::new();
        let gateway = Gateway::new(reqwest::Client::new(), &MarketConfig::default());
        let notifications = NotificationStore::new(NotificationApi::new(gateway), bus.clone());

        bus.publish(&DomainEvent::NotificationUpdated { count: Some(3) });
        bus.publish(&DomainEvent::NotificationUpdated { count: None });
        assert_eq!(notifications.current(), 3);
    }
}
