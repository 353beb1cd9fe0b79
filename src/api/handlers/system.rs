use axum::{extract::State, http::StatusCode, Json};

use crate::api::state::AppState;
use crate::services::{health_report, HealthResponse, HealthStatus};

/// GET /health -- component report; 503 when the model is unusable
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let report = health_report(&state.service);
    let code = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (code, Json(report))
}

/// GET /healthz -- process is up
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz -- pipeline fitted and able to serve
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if health_report(&state.service).status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
