use crate::{
    ChannelRegistry, FanOutDispatcher, Metrics, ReconnectBackoff, ReconnectPolicy, Subscription,
    SubscriptionState,
};

use nf_core::{Broker, BrokerMessage, BrokerStream, ChannelId, Notification};

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::sleep;

/// Owns the one broker subscription per channel.
///
/// Lock order: a subscription map shard may be held while the registry is
/// consulted (teardown). The registry never calls back into this map.
#[derive(Clone)]
pub struct SubscriptionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    broker: Arc<dyn Broker>,
    dispatcher: FanOutDispatcher,
    registry: ChannelRegistry,
    subscriptions: DashMap<ChannelId, Arc<Subscription>>,
    grace_period: Duration,
    reconnect: ReconnectPolicy,
    max_payload_bytes: usize,
    metrics: Metrics,
}

/// Everything a listener task needs, without a handle back to the manager
#[derive(Clone)]
struct ListenerContext {
    broker: Arc<dyn Broker>,
    dispatcher: FanOutDispatcher,
    reconnect: ReconnectPolicy,
    max_payload_bytes: usize,
    metrics: Metrics,
}

impl SubscriptionManager {
    pub fn new(
        broker: Arc<dyn Broker>,
        registry: ChannelRegistry,
        grace_period: Duration,
        reconnect: ReconnectPolicy,
        max_payload_bytes: usize,
        metrics: Metrics,
    ) -> Self {
        let dispatcher = FanOutDispatcher::new(registry.clone(), metrics.clone());
        Self {
            inner: Arc::new(ManagerInner {
                broker,
                dispatcher,
                registry,
                subscriptions: DashMap::new(),
                grace_period,
                reconnect,
                max_payload_bytes,
                metrics,
            }),
        }
    }

    /// Return the channel's subscription, creating it (and its listener task)
    /// if there is none. Cancels any pending grace teardown.
    pub fn ensure_subscribed(&self, channel: &ChannelId) -> Arc<Subscription> {
        let mut created = false;
        let subscription = self
            .inner
            .subscriptions
            .entry(channel.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Subscription::new(channel.clone()))
            })
            .value()
            .clone();

        subscription.bump_epoch();

        if created {
            info!("Subscribing to channel {channel}");
            self.inner.metrics.subscription_changed("created");
            self.inner.metrics.active_subscriptions(self.active_count());
            tokio::spawn(run_listener(subscription.clone(), self.listener_context()));
        }

        subscription
    }

    /// Tear the channel's subscription down once the grace window passes,
    /// unless a session attaches in the meantime.
    pub fn schedule_teardown(&self, channel: &ChannelId) {
        let Some(subscription) = self.subscription(channel) else {
            self.inner.registry.remove_if_empty(channel);
            return;
        };

        let epoch = subscription.bump_epoch();
        if self.inner.grace_period.is_zero() {
            self.teardown_if_idle(channel, &subscription, epoch);
            return;
        }

        debug!(
            "Channel {channel} idle, unsubscribing in {:?}",
            self.inner.grace_period
        );

        let manager = self.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            sleep(manager.inner.grace_period).await;
            manager.teardown_if_idle(&channel, &subscription, epoch);
        });
    }

    fn teardown_if_idle(&self, channel: &ChannelId, subscription: &Arc<Subscription>, epoch: u64) {
        let removed = self
            .inner
            .subscriptions
            .remove_if(channel, |_, current| {
                Arc::ptr_eq(current, subscription)
                    && current.epoch() == epoch
                    && self.inner.registry.remove_if_empty(channel)
            });

        if let Some((_, subscription)) = removed {
            self.stopped(&subscription, "idle");
        }
    }

    /// Stop the channel's subscription now, whether or not sessions remain
    pub fn teardown(&self, channel: &ChannelId) -> bool {
        let removed = self.inner.subscriptions.remove(channel);
        self.inner.registry.remove_if_empty(channel);

        match removed {
            Some((_, subscription)) => {
                self.stopped(&subscription, "forced");
                true
            }
            None => false,
        }
    }

    /// Stop every subscription
    pub fn shutdown(&self) {
        let channels: Vec<ChannelId> = self
            .inner
            .subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        for channel in &channels {
            self.teardown(channel);
        }

        info!("Stopped {} broker subscriptions", channels.len());
    }

    pub fn subscription(&self, channel: &ChannelId) -> Option<Arc<Subscription>> {
        self.inner
            .subscriptions
            .get(channel)
            .map(|entry| entry.value().clone())
    }

    pub fn active_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    pub fn broker_name(&self) -> &'static str {
        self.inner.broker.name()
    }

    fn stopped(&self, subscription: &Subscription, why: &str) {
        subscription.stop();
        info!(
            "Unsubscribed from channel {} ({why}, {} messages)",
            subscription.channel(),
            subscription.last_sequence()
        );
        self.inner.metrics.subscription_changed("torn_down");
        self.inner.metrics.active_subscriptions(self.active_count());
    }

    fn listener_context(&self) -> ListenerContext {
        ListenerContext {
            broker: self.inner.broker.clone(),
            dispatcher: self.inner.dispatcher.clone(),
            reconnect: self.inner.reconnect.clone(),
            max_payload_bytes: self.inner.max_payload_bytes,
            metrics: self.inner.metrics.clone(),
        }
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Pump broker deliveries into the dispatcher until stopped, reconnecting
/// whenever the broker handle is lost.
async fn run_listener(subscription: Arc<Subscription>, ctx: ListenerContext) {
    let channel = subscription.channel().clone();
    let mut stop = subscription.stop_signal();
    let mut backoff = ReconnectBackoff::new(ctx.reconnect.clone());

    loop {
        let attempt = tokio::select! {
            _ = stop_requested(&mut stop) => break,
            attempt = ctx.broker.subscribe(&channel) => attempt,
        };

        match attempt {
            Ok(stream) => {
                if subscription.reconnects() > 0 {
                    info!(
                        "Broker subscription for {channel} restored after {} attempts",
                        backoff.attempts()
                    );
                }
                subscription.set_state(SubscriptionState::Live);
                backoff.reset();

                if pump(&subscription, &ctx, stream, &mut stop).await {
                    break;
                }
            }
            Err(e) => warn!("Broker subscribe for {channel} failed: {e}"),
        }

        subscription.set_state(SubscriptionState::Reconnecting);
        subscription.record_reconnect();
        ctx.metrics.broker_reconnect();

        let delay = backoff.next_delay();
        warn!("Channel {channel} degraded: reconnecting to broker in {delay:?}");

        tokio::select! {
            _ = stop_requested(&mut stop) => break,
            _ = sleep(delay) => {}
        }
    }

    subscription.set_state(SubscriptionState::Stopped);
    debug!("Listener for {channel} exited");
}

/// Returns `true` when stopped, `false` when the broker handle was lost
async fn pump(
    subscription: &Subscription,
    ctx: &ListenerContext,
    mut stream: BrokerStream,
    stop: &mut watch::Receiver<bool>,
) -> bool {
    let channel = subscription.channel();

    loop {
        let item = tokio::select! {
            _ = stop_requested(stop) => return true,
            item = stream.next() => item,
        };

        match item {
            Some(Ok(message)) => deliver(subscription, ctx, message),
            Some(Err(e)) if e.is_malformed() => {
                warn!("Dropping malformed message on {channel}: {e}");
                ctx.metrics.malformed_message("undecodable");
            }
            Some(Err(e)) => {
                warn!("Broker connection for {channel} lost: {e}");
                return false;
            }
            None => {
                warn!("Broker stream for {channel} ended");
                return false;
            }
        }
    }
}

fn deliver(subscription: &Subscription, ctx: &ListenerContext, message: BrokerMessage) {
    let channel = subscription.channel();

    if message.channel != channel.as_str() {
        warn!(
            "Dropping message for channel '{}' received on {channel}",
            message.channel
        );
        ctx.metrics.malformed_message("channel_mismatch");
        return;
    }

    if message.payload.len() > ctx.max_payload_bytes {
        warn!(
            "Dropping {} byte message on {channel}: limit is {}",
            message.payload.len(),
            ctx.max_payload_bytes
        );
        ctx.metrics.malformed_message("oversized");
        return;
    }

    let sequence = subscription.assign_sequence();
    let notification = Notification::from_broker(channel.clone(), sequence, message);
    ctx.dispatcher.dispatch(channel, notification);
}
