//! Orchard Commerce API.
//!
//! REST backend for a small commerce platform: product catalog, warehouse
//! inventory, order assembly, customer accounts, product images, and a
//! synthetic behavior-analysis stub. Entities persist as versioned JSON
//! documents in a key-value store (`PostgreSQL` in production, in-memory in
//! tests); images go to a blob store served back at `/media`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod blob;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
