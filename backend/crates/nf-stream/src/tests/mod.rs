mod subscription_manager;

use crate::{
    Metrics, NotificationService, ReconnectPolicy, ShutdownCoordinator, StreamSession,
    StreamSettings,
};

use nf_broker::InMemoryBroker;
use nf_config::OverflowPolicy;
use nf_core::{ChannelId, Notification};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::{Instant, sleep, timeout};

pub(crate) fn channel(name: &str) -> ChannelId {
    ChannelId::parse(name).unwrap()
}

pub(crate) fn notification(channel_name: &str, sequence: u64) -> Notification {
    Notification::new(
        channel(channel_name),
        sequence,
        Bytes::from(format!("message-{sequence}")),
    )
}

pub(crate) fn active_session(
    channel_name: &str,
    capacity: usize,
    policy: OverflowPolicy,
) -> Arc<StreamSession> {
    let session = Arc::new(StreamSession::new(channel(channel_name), capacity, policy));
    session.mark_active();
    session
}

/// Short timings so lifecycle tests finish quickly
pub(crate) fn fast_settings() -> StreamSettings {
    StreamSettings {
        grace_period: Duration::from_millis(100),
        drain_timeout: Duration::from_millis(200),
        reconnect: ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..StreamSettings::default()
    }
}

pub(crate) fn test_service(
    broker: &InMemoryBroker,
    settings: StreamSettings,
) -> NotificationService {
    NotificationService::new(
        Arc::new(broker.clone()),
        settings,
        Metrics::new(),
        ShutdownCoordinator::new(),
    )
}

/// Poll `condition` until it holds or two seconds pass
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Next buffered notification, failing the test after one second
pub(crate) async fn next_notification(session: &StreamSession) -> Notification {
    timeout(Duration::from_secs(1), session.next_outbound())
        .await
        .expect("timed out waiting for notification")
        .expect("session errored")
        .expect("session ended")
}
