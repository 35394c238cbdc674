//! Feature modules: one module per backend REST resource.
//!
//! Each module translates one UI-level intent into one backend call through
//! the shared [`Gateway`](crate::gateway::Gateway): a single network round
//! trip per logical operation, no optimistic local mutation, and errors
//! rethrown with a normalized human-readable message. Modules never publish
//! domain events themselves - the publish decision stays with the
//! synchronization stores so batched mutations do not fan out redundantly.

pub mod auth;
pub mod blockchain;
pub mod cart;
pub mod chat;
pub mod notifications;
pub mod orders;
pub mod panels;
pub mod products;
pub mod reports;
pub mod reviews;
pub mod upload;

pub use auth::{AuthApi, Credentials, LoginResponse, Registration};
pub use blockchain::{NewTraceLog, TraceApi, TraceRecord};
pub use cart::CartApi;
pub use chat::{ChatClient, ChatMessage, ChatSender};
pub use notifications::NotificationApi;
pub use orders::{Order, OrderApi, OrderStatus, ShipmentStatus, ShippingInfo};
pub use panels::{NewPanel, Panel, PanelApi};
pub use products::{CatalogApi, Category, Product};
pub use reports::{ReportApi, SalesReport, TraceabilityReport};
pub use reviews::{NewReview, Review, ReviewApi};
pub use upload::{UploadApi, UploadResponse};
