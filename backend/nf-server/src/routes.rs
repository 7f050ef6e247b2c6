use crate::{admin, health, metrics_exporter, publish};

use nf_stream::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let max_payload = state.service.settings().max_payload_bytes;

    Router::new()
        // Event stream endpoint
        .route("/notifications/stream", get(nf_stream::handler))
        // Publish endpoint; oversize bodies are rejected by the service, so
        // the extractor limit leaves headroom above the payload limit
        .route(
            "/notifications/{channel}",
            post(publish).layer(DefaultBodyLimit::max(max_payload.saturating_mul(2))),
        )
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        // Admin endpoints
        .route("/admin/channels", get(admin::list_channels))
        .route("/admin/sessions", get(admin::list_sessions))
        .route("/admin/sessions/{id}/close", post(admin::close_session))
        .route("/admin/shutdown", post(admin::shutdown_handler))
        // Metrics endpoint
        .route(
            "/metrics",
            get(move || metrics_exporter::render(metrics_handle.clone())),
        )
        // Add shared state
        .with_state(state)
        // CORS middleware (allow all origins for EventSource clients)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
