//! Administrative endpoints for pipeline introspection and control.

use crate::ApiResult;

use nf_stream::{AppState, ChannelStats, SessionInfo};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelStats>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub status: String,
    pub sessions_closed: usize,
}

/// GET /admin/channels - Channels with session counts and subscription state
pub async fn list_channels(State(state): State<AppState>) -> Json<ChannelListResponse> {
    Json(ChannelListResponse {
        channels: state.service.channel_stats(),
    })
}

/// GET /admin/sessions - Every attached session
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.service.session_info(),
    })
}

/// POST /admin/sessions/{id}/close - Drain a session and end its stream
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionInfo>> {
    info!("Close requested for session {session_id}");
    let info = state.service.close_session(&session_id)?;
    Ok(Json(info))
}

/// POST /admin/shutdown - Close every session and stop the server.
///
/// Sessions are closed without flushing; the listener stops once the
/// shutdown signal reaches `axum::serve`.
pub async fn shutdown_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ShutdownResponse>) {
    info!("Graceful shutdown requested via HTTP");

    let sessions_closed = state.service.open_sessions();
    state.service.shutdown();

    (
        StatusCode::ACCEPTED,
        Json(ShutdownResponse {
            status: "shutting_down".to_string(),
            sessions_closed,
        }),
    )
}
