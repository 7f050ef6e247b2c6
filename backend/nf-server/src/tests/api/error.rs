use crate::ApiError;

use nf_core::{BrokerError, ChannelId};
use nf_stream::StreamError;

use std::panic::Location;

use axum::response::IntoResponse;
use error_location::ErrorLocation;
use googletest::prelude::*;
use http::StatusCode;
use http_body_util::BodyExt;

async fn json_body(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_not_found_error_when_rendered_then_404_with_json_body() {
    // Given
    let error = ApiError::NotFound {
        message: "Session not found".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let (status, json) = json_body(error).await;

    // Then
    assert_that!(status, eq(StatusCode::NOT_FOUND));
    assert_that!(json["error"]["code"], eq(&serde_json::json!("NOT_FOUND")));
    assert_that!(
        json["error"]["message"],
        eq(&serde_json::json!("Session not found"))
    );
}

#[tokio::test]
async fn given_invalid_channel_when_converted_then_400_invalid_channel() {
    // Given
    let stream_error = StreamError::from(ChannelId::parse("bad channel").unwrap_err());

    // When
    let (status, json) = json_body(ApiError::from(stream_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(
        json["error"]["code"],
        eq(&serde_json::json!("INVALID_CHANNEL"))
    );
}

#[tokio::test]
async fn given_payload_too_large_when_converted_then_400_payload_too_large() {
    // Given
    let stream_error = StreamError::payload_too_large(2048, 1024);

    // When
    let (status, json) = json_body(ApiError::from(stream_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(
        json["error"]["code"],
        eq(&serde_json::json!("PAYLOAD_TOO_LARGE"))
    );
}

#[tokio::test]
async fn given_shutting_down_when_converted_then_503() {
    // Given
    let stream_error = StreamError::shutting_down();

    // When
    let (status, json) = json_body(ApiError::from(stream_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::SERVICE_UNAVAILABLE));
    assert_that!(json["error"]["code"], eq(&serde_json::json!("SHUTTING_DOWN")));
}

#[tokio::test]
async fn given_missing_session_when_converted_then_404() {
    // Given
    let stream_error = StreamError::session_not_found("nope");

    // When
    let (status, _) = json_body(ApiError::from(stream_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn given_broker_failure_when_converted_then_502_hides_details() {
    // Given
    let stream_error = StreamError::from(BrokerError::publish("alerts", "connection refused"));

    // When
    let (status, json) = json_body(ApiError::from(stream_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_GATEWAY));
    assert_that!(
        json["error"]["code"],
        eq(&serde_json::json!("BROKER_UNAVAILABLE"))
    );
    let message = json["error"]["message"].to_string();
    assert_that!(message, not(contains_substring("refused")));
}
