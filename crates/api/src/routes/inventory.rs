//! Inventory API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::Inventory;
use crate::routes::actor;
use crate::services::InventoryService;
use crate::state::AppState;

/// Build the inventory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/low-stock", get(low_stock))
        .route("/{id}", get(get_one))
        .route("/product/{product_id}", get(get_by_product))
        .route("/{id}/stock", patch(update_stock))
        .route("/{id}/reserve", post(reserve))
        .route("/{id}/release", post(release))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(inventory): Json<Inventory>,
) -> Result<(StatusCode, Json<Inventory>)> {
    let created = InventoryService::new(state.store())
        .create(inventory, &actor(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Inventory>> {
    let inventory = InventoryService::new(state.store()).get(&id).await?;
    Ok(Json(inventory))
}

async fn get_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Inventory>> {
    let inventory = InventoryService::new(state.store())
        .get_by_product(&product_id)
        .await?;
    Ok(Json(inventory))
}

async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<Inventory>>> {
    let records = InventoryService::new(state.store()).low_stock().await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockUpdateRequest {
    quantity_change: i32,
}

async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<StockUpdateRequest>,
) -> Result<Json<Inventory>> {
    let updated = InventoryService::new(state.store())
        .update_stock(&id, request.quantity_change, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
struct ReservationRequest {
    quantity: i32,
}

async fn reserve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ReservationRequest>,
) -> Result<Json<Inventory>> {
    let updated = InventoryService::new(state.store())
        .reserve_stock(&id, request.quantity, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

async fn release(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ReservationRequest>,
) -> Result<Json<Inventory>> {
    let updated = InventoryService::new(state.store())
        .release_stock(&id, request.quantity, &actor(&headers))
        .await?;
    Ok(Json(updated))
}
