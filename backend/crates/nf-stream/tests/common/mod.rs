#![allow(dead_code)]

//! Test infrastructure for nf-stream handler tests

use nf_broker::InMemoryBroker;
use nf_stream::{
    AppState, Metrics, NotificationService, ReconnectPolicy, ShutdownCoordinator, StreamSettings,
    handler,
};

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::get,
};
use http_body_util::BodyExt;
use tokio::time::{sleep, timeout};

pub fn test_settings() -> StreamSettings {
    StreamSettings {
        grace_period: Duration::from_millis(50),
        reconnect: ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..StreamSettings::default()
    }
}

/// Create AppState backed by an in-memory broker
pub fn create_test_app_state(broker: &InMemoryBroker, settings: StreamSettings) -> AppState {
    let metrics = Metrics::new();
    let service = NotificationService::new(
        Arc::new(broker.clone()),
        settings,
        metrics.clone(),
        ShutdownCoordinator::new(),
    );

    AppState { service, metrics }
}

pub fn stream_router(state: AppState) -> Router {
    Router::new()
        .route("/notifications/stream", get(handler))
        .with_state(state)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read body frames until one contains a data chunk, as text
pub async fn next_chunk(body: &mut Body) -> Option<String> {
    loop {
        let frame = timeout(Duration::from_secs(2), body.frame())
            .await
            .expect("timed out waiting for SSE frame")?
            .expect("body error");

        if let Ok(data) = frame.into_data() {
            return Some(String::from_utf8_lossy(&data).into_owned());
        }
    }
}

pub async fn wait_for_listener(broker: &InMemoryBroker, channel: &str) {
    for _ in 0..400 {
        if broker.listener_count(channel) > 0 {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("no broker listener on {channel}");
}
