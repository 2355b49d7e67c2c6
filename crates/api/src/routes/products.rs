//! Product API handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::Product;
use crate::routes::actor;
use crate::services::ProductService;
use crate::state::AppState;

// Multipart overhead on top of the 5 MB image limit.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/price-range", get(price_range))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route(
            "/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<Product>)> {
    let created = ProductService::new(state.store(), state.blobs())
        .create(product, &actor(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = ProductService::new(state.store(), state.blobs())
        .get(&id)
        .await?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRangeQuery {
    min_price: Decimal,
    max_price: Decimal,
}

async fn price_range(
    State(state): State<AppState>,
    Query(query): Query<PriceRangeQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.store(), state.blobs())
        .find_by_price_range(query.min_price, query.max_price)
        .await?;
    Ok(Json(products))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<Product>,
) -> Result<Json<Product>> {
    let updated = ProductService::new(state.store(), state.blobs())
        .update(&id, patch, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

async fn delete_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    ProductService::new(state.store(), state.blobs())
        .delete(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {e}")))?;

        let key = ProductService::new(state.store(), state.blobs())
            .upload_image(&id, &filename, &content_type, &bytes, &actor(&headers))
            .await?;
        return Ok(key);
    }
    Err(ApiError::Validation("Image file is required".to_owned()))
}
