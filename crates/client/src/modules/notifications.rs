//! Unread-notification resource client.
//!
//! The authoritative fetch half of the unread-count story; the push half
//! arrives through the realtime channel. Both feed
//! [`NotificationStore`](crate::stores::NotificationStore) with
//! last-write-wins semantics.

use serde::Deserialize;
use tracing::instrument;

use agrichain_core::UserId;

use crate::error::ApiResult;
use crate::gateway::Gateway;

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    count: u32,
}

/// Client for the `/notifications` resource.
#[derive(Clone)]
pub struct NotificationApi {
    gateway: Gateway,
}

impl NotificationApi {
    /// Create a notification client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Authoritative unread count for a user.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn unread_count(&self, user_id: UserId) -> ApiResult<u32> {
        let response: UnreadCountResponse = self
            .gateway
            .get_json(&format!("/notifications/user/{user_id}/unread-count"))
            .await?;
        Ok(response.count)
    }
}
