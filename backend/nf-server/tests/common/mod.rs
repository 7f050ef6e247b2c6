#![allow(dead_code)]

//! Test infrastructure for nf-server API tests

use nf_broker::InMemoryBroker;
use nf_core::{Broker, BrokerError, BrokerResult, BrokerStream, ChannelId};
use nf_server::build_router;
use nf_stream::{
    AppState, Metrics, NotificationService, ReconnectPolicy, ShutdownCoordinator, StreamSettings,
};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::Request,
};
use futures::{StreamExt, stream};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::{sleep, timeout};

pub fn test_settings() -> StreamSettings {
    StreamSettings {
        grace_period: Duration::from_millis(50),
        drain_timeout: Duration::from_millis(200),
        reconnect: ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..StreamSettings::default()
    }
}

/// Create AppState over any broker
pub fn create_test_app_state(broker: Arc<dyn Broker>, settings: StreamSettings) -> AppState {
    let metrics = Metrics::new();
    let service = NotificationService::new(
        broker,
        settings,
        metrics.clone(),
        ShutdownCoordinator::new(),
    );

    AppState { service, metrics }
}

/// Router over an in-memory broker, with a recorder that is not installed
pub fn test_router(broker: &InMemoryBroker) -> (Router, AppState) {
    let state = create_test_app_state(Arc::new(broker.clone()), test_settings());
    let handle = PrometheusBuilder::new().build_recorder().handle();
    (build_router(state.clone(), handle), state)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}

pub async fn json_body(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
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

/// Broker whose publishes always fail and whose listen handles never deliver
pub struct UnreachableBroker;

#[async_trait]
impl Broker for UnreachableBroker {
    async fn subscribe(&self, _channel: &ChannelId) -> BrokerResult<BrokerStream> {
        Ok(stream::pending().boxed())
    }

    async fn publish(&self, channel: &ChannelId, _payload: Bytes) -> BrokerResult<()> {
        Err(BrokerError::publish(channel.as_str(), "connection refused"))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}
