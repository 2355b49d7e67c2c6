//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness check
//! GET  /health/ready                             - Readiness (pings the store)
//!
//! # Products
//! POST   /api/v1/products                        - Create product
//! GET    /api/v1/products/price-range            - Products within ?minPrice=&maxPrice=
//! GET    /api/v1/products/{id}                   - Product detail
//! PUT    /api/v1/products/{id}                   - Partial update
//! DELETE /api/v1/products/{id}                   - Delete product and image
//! POST   /api/v1/products/{id}/image             - Multipart image upload
//!
//! # Orders
//! POST  /api/v1/orders                           - Create order
//! GET   /api/v1/orders/{id}                      - Order with items
//! GET   /api/v1/orders/user/{user_id}            - Orders for a user
//! PATCH /api/v1/orders/{id}/status               - Update status
//!
//! # Inventory
//! POST  /api/v1/inventory                        - Create inventory record
//! GET   /api/v1/inventory/low-stock              - Records at LOW_STOCK
//! GET   /api/v1/inventory/{id}                   - Record detail
//! GET   /api/v1/inventory/product/{product_id}   - Record for a product
//! PATCH /api/v1/inventory/{id}/stock             - Apply stock delta
//! POST  /api/v1/inventory/{id}/reserve           - Reserve stock
//! POST  /api/v1/inventory/{id}/release           - Release reservation
//!
//! # Users
//! POST  /api/v1/users                            - Create user
//! GET   /api/v1/users/{id}                       - User detail
//! GET   /api/v1/users/email/{email}              - Lookup by email
//! PUT   /api/v1/users/{id}                       - Partial update
//! PATCH /api/v1/users/{id}/status                - Update status
//! POST  /api/v1/users/{id}/verify-email          - Mark email verified
//! POST  /api/v1/users/{id}/verify-phone          - Mark phone verified
//!
//! # Analysis
//! GET /api/v1/analysis/recommendations/{user_id} - Synthetic recommendations
//! GET /api/v1/analysis/segment                   - Synthetic segment analysis
//! ```
//!
//! Mutating requests may carry an `x-actor` header naming the caller for
//! audit stamping; absent, writes are attributed to `system`.

pub mod analysis;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;

use axum::{Json, Router, extract::State, http::HeaderMap, routing::get};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Build the `/api/v1` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/products", products::router())
        .nest("/api/v1/orders", orders::router())
        .nest("/api/v1/inventory", inventory::router())
        .nest("/api/v1/users", users::router())
        .nest("/api/v1/analysis", analysis::router())
}

/// Build the full application router, health endpoints included.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .merge(routes())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("store unreachable: {e}")))?;
    Ok(Json(serde_json::json!({"status": "ready"})))
}

/// Caller identity for audit stamping, from the `x-actor` header.
pub(crate) fn actor(headers: &HeaderMap) -> String {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("system")
        .to_owned()
}
