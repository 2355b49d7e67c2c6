//! Order API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
};

use orchard_core::OrderStatus;

use crate::error::Result;
use crate::models::Order;
use crate::routes::actor;
use crate::services::OrderService;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_one))
        .route("/user/{user_id}", get(get_user_orders))
        .route("/{id}/status", patch(update_status))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<Order>,
) -> Result<(StatusCode, Json<Order>)> {
    let created = OrderService::new(state.store())
        .create(request, &actor(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    let order = OrderService::new(state.store()).get(&id).await?;
    Ok(Json(order))
}

async fn get_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store())
        .get_user_orders(&user_id)
        .await?;
    Ok(Json(orders))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(status): Json<OrderStatus>,
) -> Result<Json<Order>> {
    let updated = OrderService::new(state.store())
        .update_status(&id, status, &actor(&headers))
        .await?;
    Ok(Json(updated))
}
