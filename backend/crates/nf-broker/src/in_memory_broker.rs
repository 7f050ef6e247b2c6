use nf_core::{Broker, BrokerError, BrokerMessage, BrokerResult, BrokerStream, ChannelId};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Per-channel buffer between publish and the listener tasks
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
enum Delivery {
    Message(BrokerMessage),
    Malformed(String),
}

/// Process-local pub/sub broker.
///
/// Like a network broker it has no memory: a publish with no live listener
/// is lost. Cloning shares the same channels.
#[derive(Clone)]
pub struct InMemoryBroker {
    inner: Arc<BrokerInner>,
}

struct BrokerInner {
    channels: DashMap<String, broadcast::Sender<Delivery>>,
    capacity: usize,
    subscribe_calls: AtomicUsize,
    failing_subscribes: AtomicUsize,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                channels: DashMap::new(),
                capacity: capacity.max(1),
                subscribe_calls: AtomicUsize::new(0),
                failing_subscribes: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of `subscribe` calls made so far, failed ones included
    pub fn subscribe_calls(&self) -> usize {
        self.inner.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Number of open listen handles for a channel
    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner
            .channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop every listen handle on `channel`, as if the broker connection was lost.
    /// Messages already queued are still delivered before the streams end.
    pub fn disconnect(&self, channel: &str) {
        if self.inner.channels.remove(channel).is_some() {
            warn!("In-memory broker: forced disconnect of channel {channel}");
        }
    }

    /// Drop every listen handle on every channel
    pub fn disconnect_all(&self) {
        let count = self.inner.channels.len();
        self.inner.channels.clear();
        warn!("In-memory broker: forced disconnect of {count} channels");
    }

    /// Make the next `count` subscribe calls fail with a connect error
    pub fn fail_next_subscribes(&self, count: usize) {
        self.inner.failing_subscribes.store(count, Ordering::SeqCst);
    }

    /// Deliver an undecodable message to the listeners of `channel`
    pub fn inject_malformed(&self, channel: &str, reason: impl Into<String>) -> usize {
        self.send(channel, Delivery::Malformed(reason.into()))
    }

    /// Deliver a raw broker message as-is, without checking that its channel
    /// field matches `channel`
    pub fn inject_raw(&self, channel: &str, message: BrokerMessage) -> usize {
        self.send(channel, Delivery::Message(message))
    }

    fn send(&self, channel: &str, delivery: Delivery) -> usize {
        let receivers = match self.inner.channels.get(channel) {
            Some(sender) => sender.send(delivery).unwrap_or(0),
            None => 0,
        };

        if receivers == 0 {
            // Nobody listening: forget the channel so it doesn't accumulate
            self.inner
                .channels
                .remove_if(channel, |_, sender| sender.receiver_count() == 0);
        }

        receivers
    }

    fn take_injected_failure(&self) -> bool {
        self.inner
            .failing_subscribes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn subscribe(&self, channel: &ChannelId) -> BrokerResult<BrokerStream> {
        self.inner.subscribe_calls.fetch_add(1, Ordering::SeqCst);

        if self.take_injected_failure() {
            return Err(BrokerError::connect(format!(
                "in-memory broker refused subscription to {channel}"
            )));
        }

        let receiver = self
            .inner
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .subscribe();

        debug!("In-memory broker: new listener on channel {channel}");

        let channel_name = channel.to_string();
        let stream = futures::stream::unfold(receiver, move |mut receiver| {
            let channel_name = channel_name.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(Delivery::Message(message)) => return Some((Ok(message), receiver)),
                        Ok(Delivery::Malformed(reason)) => {
                            return Some((Err(BrokerError::malformed(reason)), receiver));
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!(
                                "In-memory broker: listener on {channel_name} lagged, {missed} messages lost"
                            );
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn publish(&self, channel: &ChannelId, payload: Bytes) -> BrokerResult<()> {
        let receivers = self.send(
            channel.as_str(),
            Delivery::Message(BrokerMessage::new(channel.as_str(), payload)),
        );
        debug!("In-memory broker: published to {channel} ({receivers} listeners)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
