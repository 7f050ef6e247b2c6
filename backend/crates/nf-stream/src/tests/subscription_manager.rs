use crate::tests::{channel, fast_settings, next_notification, test_service, wait_until};
use crate::{ChannelRegistry, Metrics, ReconnectPolicy, SessionState, SubscriptionManager, SubscriptionState};

use nf_broker::InMemoryBroker;
use nf_core::{Broker, BrokerMessage};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use googletest::assert_that;
use googletest::prelude::{eq, ge};
use tokio::time::sleep;

fn manager(broker: &InMemoryBroker, grace_period: Duration) -> (SubscriptionManager, ChannelRegistry) {
    let registry = ChannelRegistry::new();
    let manager = SubscriptionManager::new(
        Arc::new(broker.clone()),
        registry.clone(),
        grace_period,
        ReconnectPolicy::default(),
        1024,
        Metrics::new(),
    );
    (manager, registry)
}

// =========================================================================
// Subscription lifecycle
// =========================================================================

#[tokio::test]
async fn given_existing_subscription_when_ensured_again_then_reused() {
    // Given
    let broker = InMemoryBroker::new();
    let (manager, _registry) = manager(&broker, Duration::from_millis(100));
    let first = manager.ensure_subscribed(&channel("orders"));

    // When
    let second = manager.ensure_subscribed(&channel("orders"));

    // Then
    assert!(Arc::ptr_eq(&first, &second));
    assert!(wait_until(|| first.state() == SubscriptionState::Live).await);
    assert_that!(broker.subscribe_calls(), eq(1));
    assert_that!(manager.active_count(), eq(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_many_concurrent_sessions_when_opened_then_single_broker_subscription() {
    // Given
    let broker = InMemoryBroker::new();
    let service = test_service(&broker, fast_settings());

    // When
    let mut tasks = Vec::new();
    for _ in 0..50 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move { service.open_session("orders").unwrap() }));
    }
    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }

    // Then
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    sleep(Duration::from_millis(50)).await;
    assert_that!(broker.subscribe_calls(), eq(1));
    assert_that!(service.registry().session_count(&channel("orders")), eq(50));
}

#[tokio::test]
async fn given_last_session_released_when_grace_elapses_then_unsubscribed() {
    // Given
    let broker = InMemoryBroker::new();
    let service = test_service(&broker, fast_settings());
    let handle = service.open_session("orders").unwrap();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);

    // When
    service.release(handle);

    // Then
    assert!(service.subscriptions().subscription(&channel("orders")).is_some());
    assert!(service.registry().contains(&channel("orders")));
    assert!(wait_until(|| service.subscriptions().active_count() == 0).await);
    assert!(!service.registry().contains(&channel("orders")));
    assert!(wait_until(|| broker.listener_count("orders") == 0).await);
}

#[tokio::test]
async fn given_reattach_within_grace_when_window_ends_then_subscription_reused() {
    // Given
    let broker = InMemoryBroker::new();
    let service = test_service(&broker, fast_settings());
    let first = service.open_session("orders").unwrap();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    let original = service.subscriptions().subscription(&channel("orders")).unwrap();

    // When
    service.release(first);
    sleep(Duration::from_millis(20)).await;
    let second = service.open_session("orders").unwrap();
    sleep(Duration::from_millis(250)).await;

    // Then
    let current = service.subscriptions().subscription(&channel("orders")).unwrap();
    assert!(Arc::ptr_eq(&original, &current));
    assert_that!(broker.subscribe_calls(), eq(1));
    assert_that!(second.session().state(), eq(SessionState::Active));
}

#[tokio::test]
async fn given_subscription_when_torn_down_then_listener_released() {
    let broker = InMemoryBroker::new();
    let (manager, _registry) = manager(&broker, Duration::from_secs(60));
    let subscription = manager.ensure_subscribed(&channel("orders"));
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);

    assert!(manager.teardown(&channel("orders")));

    assert!(wait_until(|| subscription.state() == SubscriptionState::Stopped).await);
    assert!(wait_until(|| broker.listener_count("orders") == 0).await);
    assert!(!manager.teardown(&channel("orders")));
}

// =========================================================================
// Broker faults
// =========================================================================

#[tokio::test]
async fn given_broker_drop_when_reconnected_then_sessions_survive_and_gap_is_lost() {
    // Given
    let broker = InMemoryBroker::new();
    let service = test_service(&broker, fast_settings());
    let handle = service.open_session("orders").unwrap();
    let session = handle.session().clone();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    service.publish("orders", Bytes::from_static(b"before")).await.unwrap();
    let before = next_notification(&session).await;

    // When
    broker.fail_next_subscribes(2);
    broker.disconnect("orders");
    service.publish("orders", Bytes::from_static(b"during")).await.unwrap();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    service.publish("orders", Bytes::from_static(b"after")).await.unwrap();
    let after = next_notification(&session).await;

    // Then
    assert_that!(before.payload.as_ref(), eq(b"before".as_slice()));
    assert_that!(after.payload.as_ref(), eq(b"after".as_slice()));
    assert_that!(after.sequence, eq(before.sequence + 1));
    assert_that!(session.state(), eq(SessionState::Active));
    assert_that!(session.buffered(), eq(0));

    let subscription = service.subscriptions().subscription(&channel("orders")).unwrap();
    assert_that!(subscription.reconnects(), ge(1));
    assert_that!(subscription.state(), eq(SubscriptionState::Live));
}

#[tokio::test]
async fn given_whole_broker_drop_when_reconnected_then_every_channel_resumes() {
    // Given
    let broker = InMemoryBroker::new();
    let service = test_service(&broker, fast_settings());
    let orders = service.open_session("orders").unwrap();
    let alerts = service.open_session("alerts").unwrap();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    assert!(wait_until(|| broker.listener_count("alerts") == 1).await);

    // When
    broker.disconnect_all();
    assert!(wait_until(|| broker.subscribe_calls() >= 4).await);
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    assert!(wait_until(|| broker.listener_count("alerts") == 1).await);
    service.publish("orders", Bytes::from_static(b"o")).await.unwrap();
    service.publish("alerts", Bytes::from_static(b"a")).await.unwrap();

    // Then
    assert_that!(next_notification(orders.session()).await.payload.as_ref(), eq(b"o".as_slice()));
    assert_that!(next_notification(alerts.session()).await.payload.as_ref(), eq(b"a".as_slice()));
    for name in ["orders", "alerts"] {
        let subscription = service.subscriptions().subscription(&channel(name)).unwrap();
        assert_that!(subscription.reconnects(), ge(1));
    }
    assert_that!(service.open_sessions(), eq(2));
}

#[tokio::test]
async fn given_failing_subscribes_when_subscribing_then_retried_until_live() {
    let broker = InMemoryBroker::new();
    broker.fail_next_subscribes(3);
    let service = test_service(&broker, fast_settings());

    let _handle = service.open_session("orders").unwrap();

    assert!(wait_until(|| broker.listener_count("orders") == 1).await);
    assert_that!(broker.subscribe_calls(), eq(4));
}

#[tokio::test]
async fn given_malformed_deliveries_when_received_then_never_reach_sessions() {
    // Given
    let broker = InMemoryBroker::new();
    let settings = crate::StreamSettings {
        max_payload_bytes: 16,
        ..fast_settings()
    };
    let service = test_service(&broker, settings);
    let handle = service.open_session("orders").unwrap();
    assert!(wait_until(|| broker.listener_count("orders") == 1).await);

    // When
    broker.inject_malformed("orders", "undecodable channel name");
    broker.inject_raw("orders", BrokerMessage::new("alerts", "wrong channel"));
    broker
        .publish(&channel("orders"), Bytes::from(vec![b'x'; 17]))
        .await
        .unwrap();
    broker
        .publish(&channel("orders"), Bytes::from_static(b"valid"))
        .await
        .unwrap();

    // Then
    let received = next_notification(handle.session()).await;
    assert_that!(received.payload.as_ref(), eq(b"valid".as_slice()));
    assert_that!(received.sequence, eq(1));
    assert_that!(handle.session().buffered(), eq(0));
}
