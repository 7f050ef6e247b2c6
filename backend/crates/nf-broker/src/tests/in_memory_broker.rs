use crate::InMemoryBroker;

use nf_core::{Broker, BrokerMessage, ChannelId};

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use googletest::assert_that;
use googletest::prelude::{eq, none};
use tokio::time::timeout;

fn channel(name: &str) -> ChannelId {
    ChannelId::parse(name).unwrap()
}

#[tokio::test]
async fn given_listener_when_published_then_message_delivered() {
    // Given
    let broker = InMemoryBroker::new();
    let orders = channel("orders");
    let mut stream = broker.subscribe(&orders).await.unwrap();

    // When
    broker
        .publish(&orders, Bytes::from_static(b"{\"id\":1}"))
        .await
        .unwrap();

    // Then
    let message = stream.next().await.unwrap().unwrap();
    assert_that!(message.channel.as_str(), eq("orders"));
    assert_that!(message.payload.as_ref(), eq(b"{\"id\":1}".as_slice()));
}

#[tokio::test]
async fn given_no_listener_when_published_then_message_is_lost() {
    // Given
    let broker = InMemoryBroker::new();
    let orders = channel("orders");
    broker
        .publish(&orders, Bytes::from_static(b"early"))
        .await
        .unwrap();

    // When
    let mut stream = broker.subscribe(&orders).await.unwrap();
    broker
        .publish(&orders, Bytes::from_static(b"late"))
        .await
        .unwrap();

    // Then
    let message = stream.next().await.unwrap().unwrap();
    assert_that!(message.payload.as_ref(), eq(b"late".as_slice()));
}

#[tokio::test]
async fn given_listeners_on_two_channels_when_published_then_only_matching_receives() {
    // Given
    let broker = InMemoryBroker::new();
    let mut orders = broker.subscribe(&channel("orders")).await.unwrap();
    let mut alerts = broker.subscribe(&channel("alerts")).await.unwrap();

    // When
    broker
        .publish(&channel("alerts"), Bytes::from_static(b"fire"))
        .await
        .unwrap();

    // Then
    let alert = alerts.next().await.unwrap().unwrap();
    assert_that!(alert.payload.as_ref(), eq(b"fire".as_slice()));
    let nothing = timeout(Duration::from_millis(50), orders.next()).await;
    assert!(nothing.is_err());
}

#[tokio::test]
async fn given_disconnect_when_listening_then_stream_ends() {
    // Given
    let broker = InMemoryBroker::new();
    let mut stream = broker.subscribe(&channel("orders")).await.unwrap();

    // When
    broker.disconnect("orders");

    // Then
    let end = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_that!(end.map(|item| item.is_ok()), none());
    assert_that!(broker.listener_count("orders"), eq(0));
}

#[tokio::test]
async fn given_injected_failures_when_subscribing_then_fails_that_many_times() {
    // Given
    let broker = InMemoryBroker::new();
    let orders = channel("orders");
    broker.fail_next_subscribes(2);

    // When
    let first = broker.subscribe(&orders).await;
    let second = broker.subscribe(&orders).await;
    let third = broker.subscribe(&orders).await;

    // Then
    assert!(first.is_err());
    assert!(second.is_err());
    assert!(third.is_ok());
    assert_that!(broker.subscribe_calls(), eq(3));
}

#[tokio::test]
async fn given_malformed_delivery_when_listening_then_error_item_and_stream_survives() {
    // Given
    let broker = InMemoryBroker::new();
    let orders = channel("orders");
    let mut stream = broker.subscribe(&orders).await.unwrap();

    // When
    broker.inject_malformed("orders", "invalid utf-8 channel");
    broker.inject_raw("orders", BrokerMessage::new("orders", "ok"));

    // Then
    let bad = stream.next().await.unwrap();
    assert!(bad.unwrap_err().is_malformed());
    let good = stream.next().await.unwrap().unwrap();
    assert_that!(good.payload.as_ref(), eq(b"ok".as_slice()));
}

#[tokio::test]
async fn given_dropped_stream_when_published_then_listener_released() {
    // Given
    let broker = InMemoryBroker::new();
    let orders = channel("orders");
    let stream = broker.subscribe(&orders).await.unwrap();
    assert_that!(broker.listener_count("orders"), eq(1));

    // When
    drop(stream);
    broker
        .publish(&orders, Bytes::from_static(b"x"))
        .await
        .unwrap();

    // Then
    assert_that!(broker.listener_count("orders"), eq(0));
}
