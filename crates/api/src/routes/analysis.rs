//! Behavior analysis API handlers.
//!
//! Both endpoints take the behavior snapshot in the request body; nothing
//! here touches the store.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::error::Result;
use crate::models::UserBehavior;
use crate::services::AnalysisService;
use crate::services::analysis::{PreferencePrediction, Recommendations, SegmentAnalysis};
use crate::state::AppState;

/// Build the analysis router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preferences/{user_id}", get(preferences))
        .route("/recommendations/{user_id}", get(recommendations))
        .route("/segment", get(segment))
}

async fn preferences(
    State(_state): State<AppState>,
    Path(user_id): Path<String>,
    Json(behavior): Json<UserBehavior>,
) -> Result<Json<PreferencePrediction>> {
    let prediction = AnalysisService::new().predict_user_preferences(&user_id, &behavior);
    Ok(Json(prediction))
}

async fn recommendations(
    State(_state): State<AppState>,
    Path(user_id): Path<String>,
    Json(behavior): Json<UserBehavior>,
) -> Result<Json<Recommendations>> {
    let recs = AnalysisService::new().get_product_recommendations(&user_id, &behavior);
    Ok(Json(recs))
}

async fn segment(
    State(_state): State<AppState>,
    Json(behavior): Json<UserBehavior>,
) -> Result<Json<SegmentAnalysis>> {
    let analysis = AnalysisService::new().analyze_user_segment(&behavior);
    Ok(Json(analysis))
}
