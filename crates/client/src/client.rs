//! Assembled client facade.
//!
//! [`MarketClient`] wires the shared HTTP client, gateway, local store, and
//! event bus into the feature modules and synchronization stores, so
//! embedders construct one object and borrow the pieces they need.

use std::sync::Arc;

use tracing::{info, instrument};

use agrichain_core::{Session, StoreKey, UserId};

use crate::bus::EventBus;
use crate::config::MarketConfig;
use crate::gateway::Gateway;
use crate::modules::{
    AuthApi, CartApi, CatalogApi, ChatClient, NotificationApi, OrderApi, PanelApi, ReportApi,
    ReviewApi, TraceApi, UploadApi,
};
use crate::realtime::{ChatHandler, RealtimeChannel};
use crate::store::LocalStore;
use crate::stores::{CartStore, NotificationStore};

/// One fully wired AgriChain Market client.
pub struct MarketClient {
    config: MarketConfig,
    http: reqwest::Client,
    store: LocalStore,
    bus: EventBus,
    catalog: CatalogApi,
    orders: OrderApi,
    auth: AuthApi,
    reviews: ReviewApi,
    panels: PanelApi,
    reports: ReportApi,
    chat: ChatClient,
    trace: TraceApi,
    upload: UploadApi,
    cart: CartStore,
    notifications: NotificationStore,
}

impl MarketClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Fails only when the local-store directory cannot be created.
    pub fn new(config: MarketConfig) -> std::io::Result<Self> {
        let http = reqwest::Client::new();
        let gateway = Gateway::new(http.clone(), &config);
        let store = LocalStore::open(&config.data_dir)?;
        let bus = EventBus::new();

        let cart = CartStore::new(CartApi::new(gateway.clone()), store.clone(), bus.clone());
        let notifications =
            NotificationStore::new(NotificationApi::new(gateway.clone()), bus.clone());
        let chat = ChatClient::new(gateway.clone(), store.clone());
        let upload = UploadApi::new(gateway.clone(), config.upload_url.clone());

        Ok(Self {
            catalog: CatalogApi::new(gateway.clone()),
            orders: OrderApi::new(gateway.clone()),
            auth: AuthApi::new(gateway.clone()),
            reviews: ReviewApi::new(gateway.clone()),
            panels: PanelApi::new(gateway.clone()),
            reports: ReportApi::new(gateway.clone()),
            chat,
            trace: TraceApi::new(gateway),
            upload,
            cart,
            notifications,
            config,
            http,
            store,
            bus,
        })
    }

    /// The event bus shared by every store; subscribe here to re-render.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The persistent local store.
    #[must_use]
    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Cart synchronization store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Unread-count synchronization store.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Product catalog client.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogApi {
        &self.catalog
    }

    /// Order and shipping client.
    #[must_use]
    pub const fn orders(&self) -> &OrderApi {
        &self.orders
    }

    /// Authentication client.
    #[must_use]
    pub const fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// Review client.
    #[must_use]
    pub const fn reviews(&self) -> &ReviewApi {
        &self.reviews
    }

    /// Panel editor client.
    #[must_use]
    pub const fn panels(&self) -> &PanelApi {
        &self.panels
    }

    /// Reporting client.
    #[must_use]
    pub const fn reports(&self) -> &ReportApi {
        &self.reports
    }

    /// Chatbot client.
    #[must_use]
    pub const fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// Traceability client.
    #[must_use]
    pub const fn trace(&self) -> &TraceApi {
        &self.trace
    }

    /// File upload client.
    #[must_use]
    pub const fn upload(&self) -> &UploadApi {
        &self.upload
    }

    /// The cached session, when someone is logged in.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.store.read(&StoreKey::User, None)
    }

    /// Persist a freshly issued session and token.
    ///
    /// The gateway's bearer token is fixed at construction: rebuild the
    /// client with [`MarketConfig::with_token`] to authenticate subsequent
    /// requests.
    pub fn store_session(&self, session: &Session, token: &str) {
        self.store.write(&StoreKey::User, session);
        self.store.write(&StoreKey::Token, &token.to_string());
    }

    /// Open the realtime push channel for a user.
    #[must_use]
    pub fn connect_realtime(&self, user_id: UserId, on_chat: ChatHandler) -> RealtimeChannel {
        RealtimeChannel::spawn(
            self.http.clone(),
            &self.config.socket_url,
            user_id,
            self.bus.clone(),
            on_chat,
        )
    }

    /// Open the realtime channel without a chat consumer.
    #[must_use]
    pub fn connect_realtime_notifications(&self, user_id: UserId) -> RealtimeChannel {
        self.connect_realtime(user_id, Arc::new(|_| {}))
    }

    /// Log out: drop the session, token, cart mirror, and the user's chat
    /// history. Views are told to re-derive via `cart-updated`.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        if let Some(session) = self.session() {
            self.store.remove(&StoreKey::ChatHistory(session.id));
        }
        self.store.remove(&StoreKey::User);
        self.store.remove(&StoreKey::Token);
        self.cart.clear();
        info!("logged out, local state cleared");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use agrichain_core::Role;

    fn client() -> (tempfile::TempDir, MarketClient) {
        let dir = tempfile::tempdir().unwrap();
        let config = MarketConfig {
            data_dir: dir.path().to_path_buf(),
            ..MarketConfig::default()
        };
        let client = MarketClient::new(config).unwrap();
        (dir, client)
    }

    fn session() -> Session {
        Session {
            id: UserId::new(7),
            email: "ada@farm.example".to_string(),
            full_name: "Ada Farmer".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_session_round_trip() {
        let (_dir, client) = client();
        assert!(client.session().is_none());
        client.store_session(&session(), "tok-123");
        assert_eq!(client.session(), Some(session()));
    }

    #[test]
    fn test_logout_clears_session_token_cart_and_chat() {
        let (_dir, client) = client();
        client.store_session(&session(), "tok-123");
        client
            .store()
            .write(&StoreKey::ChatHistory(UserId::new(7)), &vec!["hi".to_string()]);

        client.logout();

        assert!(client.session().is_none());
        let token: Option<String> = client.store().read(&StoreKey::Token, None);
        assert!(token.is_none());
        assert!(client.cart().current().is_empty());
        let chat: Vec<String> = client
            .store()
            .read(&StoreKey::ChatHistory(UserId::new(7)), Vec::new());
        assert!(chat.is_empty());
    }
}
