//! Orchard Core - Shared types library.
//!
//! This crate provides the common domain types used by the Orchard Commerce
//! API service:
//! - Newtype string IDs for every entity
//! - The [`Email`](types::Email) parse type (lower-cased, structurally valid)
//! - Status enums for products, inventory, orders, and users
//! - The [`Meta`](types::Meta) audit block shared by every persisted record
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
