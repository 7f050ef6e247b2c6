use crate::{ChannelRegistry, DispatchReport, DispatchTimer, EnqueueOutcome, Metrics};

use nf_core::{ChannelId, Notification};

use log::{error, trace};

/// Delivers a notification to every live session on its channel.
///
/// Sessions are snapshotted under the channel's read lock and enqueued
/// outside it. One session failing never stops delivery to the rest.
#[derive(Clone)]
pub struct FanOutDispatcher {
    registry: ChannelRegistry,
    metrics: Metrics,
}

impl FanOutDispatcher {
    pub fn new(registry: ChannelRegistry, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    pub fn dispatch(&self, channel: &ChannelId, notification: Notification) -> DispatchReport {
        let timer = DispatchTimer::start(&self.metrics);
        let mut report = DispatchReport::default();

        for session in self.registry.lookup_sessions(channel) {
            match session.enqueue(notification.clone()) {
                Ok(EnqueueOutcome::Accepted { evicted }) => {
                    report.delivered += 1;
                    if evicted {
                        self.metrics.notification_evicted();
                    }
                }
                Ok(EnqueueOutcome::Dropped(reason)) => {
                    report.dropped += 1;
                    self.metrics.notification_dropped(reason);
                }
                Err(e) => {
                    error!("Dispatch to session {} failed: {e}", session.id());
                    session.fail(e.to_string());
                    report.failed += 1;
                }
            }
        }

        trace!(
            "Dispatched {}#{}: {} delivered, {} dropped, {} failed",
            channel, notification.sequence, report.delivered, report.dropped, report.failed
        );

        timer.finish(report)
    }
}
