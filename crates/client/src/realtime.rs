//! Realtime notification channel.
//!
//! Transport boundary for the backend's push stream: a long-lived NDJSON
//! HTTP stream, one JSON object per line. Opening the stream registers the
//! user id with the backend; thereafter the backend pushes named messages.
//!
//! This module owns the transport concerns - connecting, line framing,
//! reconnecting after a drop - and nothing else. Application code sees only
//! the resulting domain events on the bus (and chat replies through the
//! supplied handler). The channel is best-effort: connection failures are
//! logged, never surfaced, and the worst case is a stale badge until the
//! next authoritative fetch.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, info, warn};

use agrichain_core::{DomainEvent, UserId};

use crate::bus::EventBus;

/// Delay before re-opening a dropped stream.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Names the backend uses for pushed messages.
const EVENT_NOTIFICATION: &str = "notification";
const EVENT_CHATBOT_RESPONSE: &str = "chatbot_response";

/// One pushed message, as framed on the wire.
#[derive(Debug, Deserialize)]
pub struct PushMessage {
    /// Message name (`notification` or `chatbot_response`).
    pub event: String,
    /// Human-readable payload.
    #[serde(default)]
    pub message: Option<String>,
    /// Explicit unread count; carried through literally, never merged.
    #[serde(default)]
    pub count: Option<u32>,
}

/// Handler invoked with the text of each `chatbot_response` push.
pub type ChatHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Handle to a running push channel. Dropping it (or calling
/// [`close`](Self::close)) stops inbound delivery - there is no other
/// cancellation path.
pub struct RealtimeChannel {
    task: tokio::task::JoinHandle<()>,
}

impl RealtimeChannel {
    /// Open the push stream for `user_id` and keep it open until closed.
    ///
    /// Pushed `notification` messages publish
    /// [`DomainEvent::NotificationUpdated`] carrying the pushed count
    /// literally; `chatbot_response` messages go to `on_chat`.
    #[must_use]
    pub fn spawn(
        client: reqwest::Client,
        socket_url: &str,
        user_id: UserId,
        bus: EventBus,
        on_chat: ChatHandler,
    ) -> Self {
        let url = format!("{socket_url}/events?user={user_id}");
        let task = tokio::spawn(async move {
            loop {
                match client.get(&url).send().await {
                    Ok(response) if response.status().is_success() => {
                        info!(%user_id, "realtime channel connected");
                        read_stream(response, &bus, &on_chat).await;
                        warn!(%user_id, "realtime channel dropped, reconnecting");
                    }
                    Ok(response) => {
                        warn!(status = %response.status(), "realtime channel refused");
                    }
                    Err(e) => {
                        warn!(error = %e, "realtime channel connection failed");
                    }
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });
        Self { task }
    }

    /// Stop inbound delivery.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read NDJSON lines off an open stream until it ends or errors.
async fn read_stream(response: reqwest::Response, bus: &EventBus, on_chat: &ChatHandler) {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "realtime stream read failed");
                return;
            }
        };
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<PushMessage>(line) {
                Ok(message) => dispatch(message, bus, on_chat),
                Err(e) => debug!(error = %e, "ignoring unparseable push line"),
            }
        }
    }
}

/// Route one pushed message: publish the domain event or hand off the chat
/// reply. Unknown message names are ignored.
fn dispatch(message: PushMessage, bus: &EventBus, on_chat: &ChatHandler) {
    match message.event.as_str() {
        EVENT_NOTIFICATION => {
            bus.publish(&DomainEvent::NotificationUpdated {
                count: message.count,
            });
        }
        EVENT_CHATBOT_RESPONSE => {
            if let Some(text) = message.message {
                on_chat(text);
            }
        }
        other => debug!(event = other, "ignoring unknown push event"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use agrichain_core::Channel;

    #[test]
    fn test_notification_push_publishes_literal_count() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let _sub = bus.subscribe(Channel::NotificationUpdated, move |event| {
            if let DomainEvent::NotificationUpdated { count } = event {
                *slot.lock().unwrap() = *count;
            }
        });
        let on_chat: ChatHandler = Arc::new(|_| {});

        let message: PushMessage =
            serde_json::from_str(r#"{"event":"notification","message":"order shipped","count":5}"#)
                .unwrap();
        dispatch(message, &bus, &on_chat);

        assert_eq!(*seen.lock().unwrap(), Some(5));
    }

    #[test]
    fn test_notification_push_without_count_publishes_refetch_signal() {
        let bus = EventBus::new();
        let fired = Arc::new(Mutex::new(false));
        let slot = Arc::clone(&fired);
        let _sub = bus.subscribe(Channel::NotificationUpdated, move |event| {
            assert_eq!(event, &DomainEvent::NotificationUpdated { count: None });
            *slot.lock().unwrap() = true;
        });
        let on_chat: ChatHandler = Arc::new(|_| {});

        let message: PushMessage =
            serde_json::from_str(r#"{"event":"notification"}"#).unwrap();
        dispatch(message, &bus, &on_chat);

        assert!(*fired.lock().unwrap());
    }

    #[test]
    fn test_chatbot_response_routed_to_handler() {
        let bus = EventBus::new();
        let replies = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&replies);
        let on_chat: ChatHandler = Arc::new(move |text| sink.lock().unwrap().push(text));

        let message: PushMessage = serde_json::from_str(
            r#"{"event":"chatbot_response","message":"Tomatoes are in season."}"#,
        )
        .unwrap();
        dispatch(message, &bus, &on_chat);

        assert_eq!(
            *replies.lock().unwrap(),
            vec!["Tomatoes are in season.".to_string()]
        );
    }

    #[test]
    fn test_unknown_event_ignored() {
        let bus = EventBus::new();
        let on_chat: ChatHandler = Arc::new(|_| panic!("must not be called"));
        let message: PushMessage =
            serde_json::from_str(r#"{"event":"presence","message":"x"}"#).unwrap();
        dispatch(message, &bus, &on_chat);
    }
}
