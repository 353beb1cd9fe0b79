use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Form page
        .route("/", get(handlers::show_form).post(handlers::submit_form))
        // JSON endpoints
        .route("/api/predict", post(handlers::predict))
        .route("/api/options", get(handlers::get_options))
        .route("/api/schema", get(handlers::get_schema))
        // Probes
        .route("/health", get(handlers::health_handler))
        .route("/healthz", get(handlers::liveness_handler))
        .route("/readyz", get(handlers::readiness_handler))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
