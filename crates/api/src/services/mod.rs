//! Business logic services.
//!
//! Services are stateless: each one borrows the shared store (and blob
//! store where needed) and is constructed per request. Validation
//! accumulates every failed check into one message joined by `", "` rather
//! than short-circuiting on the first.

pub mod analysis;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;

pub use analysis::AnalysisService;
pub use inventory::InventoryService;
pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;
