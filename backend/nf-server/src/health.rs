use nf_stream::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - Component status and pipeline counts
pub async fn health(State(state): State<AppState>) -> Response {
    let service = &state.service;
    let status = if service.is_shutting_down() {
        "shutting_down"
    } else {
        "healthy"
    };

    let health = json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "broker": service.subscriptions().broker_name(),
            "stream": "operational",
        },
        "sessions": service.open_sessions(),
        "channels": service.registry().channel_ids().len(),
        "subscriptions": service.subscriptions().active_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Liveness probe (is the process alive?)
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Readiness probe (ready to accept streams?)
pub async fn readiness(State(state): State<AppState>) -> Response {
    if state.service.is_shutting_down() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Shutting down").into_response();
    }

    (StatusCode::OK, "Ready").into_response()
}
