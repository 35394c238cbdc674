//! Registry of local-store keys.
//!
//! The browser original scattered string keys (`"user"`, `"cart"`, ...)
//! across components. Here the key space is a closed enum so callers cannot
//! invent ad hoc keys, and per-user keys carry their scope in the type.

use crate::types::id::UserId;

/// A well-known key in the persistent local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The current session (`Session` JSON).
    User,
    /// The opaque auth token.
    Token,
    /// The mirrored `CartSnapshot`.
    Cart,
    /// Chat history for one user.
    ChatHistory(UserId),
}

impl StoreKey {
    /// Render the key as stored on disk. Matches the key names the backend's
    /// web client uses so data stays inspectable.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::User => "user".to_string(),
            Self::Token => "token".to_string(),
            Self::Cart => "cart".to_string(),
            Self::ChatHistory(user_id) => format!("chat_history_{user_id}"),
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering() {
        assert_eq!(StoreKey::User.as_key(), "user");
        assert_eq!(StoreKey::Token.as_key(), "token");
        assert_eq!(StoreKey::Cart.as_key(), "cart");
        assert_eq!(
            StoreKey::ChatHistory(UserId::new(7)).as_key(),
            "chat_history_7"
        );
    }

    #[test]
    fn test_per_user_keys_are_distinct() {
        assert_ne!(
            StoreKey::ChatHistory(UserId::new(1)),
            StoreKey::ChatHistory(UserId::new(2))
        );
    }
}
