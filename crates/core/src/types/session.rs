//! User session types.
//!
//! Sessions are issued by the authentication collaborator. This layer only
//! reads them - to key per-user caches (chat history, unread counts) - and
//! never mutates them.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Role assigned to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    Customer,
    /// Producer listing goods with traceability records.
    Farmer,
    /// Platform administrator (panel editor, reports).
    Admin,
}

/// An authenticated user session as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Display name.
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// Assigned role.
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_deserializes_backend_shape() {
        let json = r#"{"id":12,"email":"ada@farm.example","fullName":"Ada Farmer","role":"farmer"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, UserId::new(12));
        assert_eq!(session.role, Role::Farmer);
        assert_eq!(session.full_name, "Ada Farmer");
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Customer, Role::Farmer, Role::Admin] {
            let json = serde_json::to_string(&role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }
}
