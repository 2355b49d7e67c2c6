//! Core types for Orchard Commerce.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod meta;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use meta::Meta;
pub use status::*;
