//! Domain events broadcast on the in-process event bus.
//!
//! A [`DomainEvent`] is a named signal telling subscribers to re-derive UI
//! state. Payloads are a closed tagged union: subscribers pattern-match
//! instead of probing optional fields.

use serde::{Deserialize, Serialize};

/// The closed set of event channels.
///
/// Channel names match the backend's browser-event vocabulary so logs stay
/// comparable across clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// The cart changed; listeners must re-derive state (no payload).
    CartUpdated,
    /// The unread notification count changed or should be re-fetched.
    NotificationUpdated,
}

impl Channel {
    /// Wire name of the channel.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CartUpdated => "cart-updated",
            Self::NotificationUpdated => "notification-updated",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An application-defined named signal broadcast within a single process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum DomainEvent {
    /// The cart changed. Carries no payload: listeners re-derive truth from
    /// the local store or a fresh fetch rather than trusting a detail value.
    CartUpdated,
    /// The unread notification count changed.
    NotificationUpdated {
        /// `Some(n)` is an authoritative literal count (last-write-wins,
        /// never accumulated). `None` asks listeners to re-fetch.
        count: Option<u32>,
    },
}

impl DomainEvent {
    /// The channel this event is delivered on.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::CartUpdated => Channel::CartUpdated,
            Self::NotificationUpdated { .. } => Channel::NotificationUpdated,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::CartUpdated.name(), "cart-updated");
        assert_eq!(Channel::NotificationUpdated.name(), "notification-updated");
    }

    #[test]
    fn test_event_channel_mapping() {
        assert_eq!(DomainEvent::CartUpdated.channel(), Channel::CartUpdated);
        assert_eq!(
            DomainEvent::NotificationUpdated { count: Some(3) }.channel(),
            Channel::NotificationUpdated
        );
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = DomainEvent::NotificationUpdated { count: Some(5) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "notification-updated");
        assert_eq!(json["count"], 5);
    }
}
