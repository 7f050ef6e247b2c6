use crate::{Metrics, NotificationService};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{KeepAlive, Sse},
    },
};
use futures::stream;
use log::{debug, warn};
use serde::Deserialize;

/// Shared application state for stream handlers
#[derive(Clone)]
pub struct AppState {
    pub service: NotificationService,
    pub metrics: Metrics,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub channel: Option<String>,
}

/// `GET /notifications/stream?channel=<id>`: open a session and stream it as
/// server-sent events
pub async fn handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Response, StatusCode> {
    let Some(channel) = query.channel.filter(|channel| !channel.is_empty()) else {
        warn!("Stream request without channel");
        return Err(StatusCode::BAD_REQUEST);
    };

    let handle = state.service.open_session(&channel).map_err(|e| {
        debug!("Rejected stream request for '{channel}': {e}");
        state.metrics.session_rejected(e.error_code());
        e.status_code()
    })?;

    let keep_alive = state.service.settings().keep_alive;
    let session_stream = state.service.start_stream(handle);

    let body = stream::unfold(session_stream, |mut session_stream| async move {
        session_stream
            .next()
            .await
            .map(|event| (event, session_stream))
    });

    Ok(Sse::new(body)
        .keep_alive(KeepAlive::new().interval(keep_alive))
        .into_response())
}
