use crate::{ApiResult, PublishResponse};

use nf_stream::AppState;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bytes::Bytes;
use log::debug;

/// POST /notifications/{channel} - Publish the raw request body to a channel
pub async fn publish(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PublishResponse>)> {
    let bytes = body.len();
    state.service.publish(&channel, body).await?;

    debug!("Published {bytes} bytes to {channel}");

    Ok((StatusCode::ACCEPTED, Json(PublishResponse { channel, bytes })))
}
