//! Core types for the AgriChain Market client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod event;
pub mod id;
pub mod key;
pub mod session;

pub use cart::{CartLine, CartLineError, CartSnapshot};
pub use event::{Channel, DomainEvent};
pub use id::*;
pub use key::StoreKey;
pub use session::{Role, Session};
