//! AgriChain Market client SDK.
//!
//! # Architecture
//!
//! The backend is the system of record; this crate keeps embedded views
//! consistent with it through an event-driven synchronization layer:
//!
//! - [`gateway`] - uniform request execution: per-request deadline, one
//!   attempt per call, and a single response/error contract
//! - [`store`] - persistent local cache that fails soft (malformed data
//!   yields defaults, never errors)
//! - [`bus`] - same-process publish/subscribe with synchronous, in-order
//!   dispatch
//! - [`modules`] - one client per REST resource, each a single round trip
//!   per operation
//! - [`stores`] - the fetch-mirror-publish cycle for the cart and the
//!   unread badge, with stale-response discard
//! - [`realtime`] - the push channel (transport-owned reconnection)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agrichain_client::{MarketClient, MarketConfig};
//! use agrichain_core::{Channel, ProductId, UserId};
//!
//! let client = MarketClient::new(MarketConfig::from_env()?)?;
//! let user = UserId::new(7);
//!
//! // Re-render the badge whenever anyone mutates the cart.
//! let _badge = client.bus().subscribe(Channel::CartUpdated, {
//!     let cart = client.cart().clone();
//!     move |_| println!("cart: {} items", cart.current().item_count())
//! });
//!
//! client.cart().add_item(user, ProductId::new(42), 3).await?;
//! let _push = client.connect_realtime_notifications(user);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod modules;
pub mod realtime;
pub mod store;
pub mod stores;

pub use bus::{EventBus, Subscription};
pub use client::MarketClient;
pub use config::{ConfigError, MarketConfig};
pub use error::{ApiError, ApiResult};
pub use gateway::Gateway;
pub use realtime::{ChatHandler, PushMessage, RealtimeChannel};
pub use store::{LocalStore, StoreWatch};
pub use stores::{CartStore, NotificationStore};
