use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use crate::config::AppMetadata;

/// Ungated routes: /info and /health.
pub fn routes(metadata: AppMetadata) -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/health", get(health))
        .with_state(metadata)
}

/// GET /info
async fn info(State(metadata): State<AppMetadata>) -> Json<AppMetadata> {
    Json(metadata)
}

/// GET /health
async fn health() -> &'static str {
    "Healthy"
}
