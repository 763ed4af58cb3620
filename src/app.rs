use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppMetadata;
use crate::routes::{system_routes, values_routes};
use crate::services::auth_service::AuthGate;
use crate::state::values::SharedStore;

/// Build the complete Axum application:
/// - /values   (record operations, credential header required)
/// - /info     (app metadata)
/// - /health   (liveness)
pub fn build_app(store: SharedStore, gate: AuthGate, metadata: AppMetadata) -> Router {
    Router::new()
        .merge(values_routes::routes(store, gate))
        .merge(system_routes::routes(metadata))

        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
