//! Persisted entity models.
//!
//! Every entity embeds the shared [`Meta`](orchard_core::Meta) block
//! (flattened) and serializes camelCase; the persisted document shape mirrors
//! the wire shape one-to-one. Fields the client may omit are `Option`s so the
//! services can accumulate validation errors instead of failing to parse.

pub mod behavior;
pub mod inventory;
pub mod order;
pub mod product;
pub mod user;

pub use behavior::UserBehavior;
pub use inventory::Inventory;
pub use order::{Order, OrderItem};
pub use product::Product;
pub use user::User;
