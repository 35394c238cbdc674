//! Chatbot resource client with locally mirrored history.
//!
//! History is keyed per user (`chat_history_{userId}`) in the persistent
//! local store so the widget reopens with context before the backend
//! answers. The backend copy remains authoritative: `history()` replaces
//! the mirror wholesale, and `clear()` removes both copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agrichain_core::{StoreKey, UserId};

use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::store::LocalStore;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Bot,
}

/// One message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub sender: ChatSender,
    /// Message text.
    pub text: String,
    /// Send timestamp.
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    user_id: UserId,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

/// Client for the `/chatbot` resource.
#[derive(Clone)]
pub struct ChatClient {
    gateway: Gateway,
    store: LocalStore,
}

impl ChatClient {
    /// Create a chat client over the shared gateway and local store.
    #[must_use]
    pub const fn new(gateway: Gateway, store: LocalStore) -> Self {
        Self { gateway, store }
    }

    /// Send a message and return the bot's reply. Both sides of the
    /// exchange are appended to the local history mirror.
    ///
    /// # Errors
    ///
    /// Any gateway error; on failure the mirror is left unchanged.
    #[instrument(skip(self, text), fields(user_id = %user_id))]
    pub async fn send(&self, user_id: UserId, text: &str) -> ApiResult<ChatMessage> {
        let request = ChatRequest {
            user_id,
            message: text,
        };
        let response: ChatReply = self.gateway.post_json("/chatbot/message", &request).await?;

        let now = Utc::now();
        let reply = ChatMessage {
            sender: ChatSender::Bot,
            text: response.reply,
            sent_at: now,
        };

        let key = StoreKey::ChatHistory(user_id);
        let mut history: Vec<ChatMessage> = self.store.read(&key, Vec::new());
        history.push(ChatMessage {
            sender: ChatSender::User,
            text: text.to_string(),
            sent_at: now,
        });
        history.push(reply.clone());
        self.store.write(&key, &history);

        Ok(reply)
    }

    /// Fetch the authoritative transcript and replace the local mirror.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn history(&self, user_id: UserId) -> ApiResult<Vec<ChatMessage>> {
        let history: Vec<ChatMessage> = self
            .gateway
            .get_json(&format!("/chatbot/history/{user_id}"))
            .await?;
        self.store
            .write(&StoreKey::ChatHistory(user_id), &history);
        Ok(history)
    }

    /// The locally mirrored transcript, without a network round trip.
    #[must_use]
    pub fn cached_history(&self, user_id: UserId) -> Vec<ChatMessage> {
        self.store
            .read(&StoreKey::ChatHistory(user_id), Vec::new())
    }

    /// Delete the transcript on the backend and locally.
    ///
    /// # Errors
    ///
    /// Any gateway error; the local mirror is removed only after the
    /// backend delete succeeds.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> ApiResult<()> {
        self.gateway
            .delete_empty(&format!("/chatbot/history/{user_id}"))
            .await?;
        self.store.remove(&StoreKey::ChatHistory(user_id));
        Ok(())
    }
}
