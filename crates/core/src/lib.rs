//! AgriChain Core - Shared types library.
//!
//! This crate provides common types used across all AgriChain Market client
//! components:
//! - `client` - The SDK (gateway, local store, event bus, feature modules)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no file
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, cart snapshots, sessions, domain events, and
//!   the local-store key registry

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
