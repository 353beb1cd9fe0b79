use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::api::{handlers::reject, state::AppState, types::SchemaResponse};
use crate::domain::{RawListing, TARGET_COLUMN};
use crate::services::{CategoryOptions, Estimate};

/// POST /api/predict
pub async fn predict(
    State(state): State<AppState>,
    Json(listing): Json<RawListing>,
) -> std::result::Result<Json<Estimate>, (StatusCode, String)> {
    state.service.estimate(&listing).map(Json).map_err(|e| {
        warn!(error = %e, "api prediction failed");
        reject(e)
    })
}

/// GET /api/options -- drop-down values per categorical column
pub async fn get_options(State(state): State<AppState>) -> Json<CategoryOptions> {
    Json(state.service.options().clone())
}

/// GET /api/schema
pub async fn get_schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    let pipeline = state.service.pipeline();
    Json(SchemaResponse {
        columns: pipeline.schema().columns().to_vec(),
        target: TARGET_COLUMN.to_string(),
        encoded_features: pipeline.feature_names(),
    })
}
