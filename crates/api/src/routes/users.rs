//! User API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
};

use orchard_core::UserStatus;

use crate::error::Result;
use crate::models::User;
use crate::routes::actor;
use crate::services::UserService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_one).put(update))
        .route("/email/{email}", get(get_by_email))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/verify-email", post(verify_email))
        .route("/{id}/verify-phone", post(verify_phone))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(user): Json<User>,
) -> Result<(StatusCode, Json<User>)> {
    let created = UserService::new(state.store())
        .create(user, &actor(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let user = UserService::new(state.store()).get(&id).await?;
    Ok(Json(user))
}

async fn get_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>> {
    let user = UserService::new(state.store()).get_by_email(&email).await?;
    Ok(Json(user))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<User>,
) -> Result<Json<User>> {
    let updated = UserService::new(state.store())
        .update(&id, patch, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(status): Json<UserStatus>,
) -> Result<Json<User>> {
    let updated = UserService::new(state.store())
        .update_status(&id, status, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

async fn verify_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>> {
    let updated = UserService::new(state.store())
        .verify_email(&id, &actor(&headers))
        .await?;
    Ok(Json(updated))
}

async fn verify_phone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>> {
    let updated = UserService::new(state.store())
        .verify_phone(&id, &actor(&headers))
        .await?;
    Ok(Json(updated))
}
