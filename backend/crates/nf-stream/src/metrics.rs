use crate::{DispatchReport, DropReason};

use metrics::{counter, gauge, histogram};

/// Metrics collector for fan-out operations
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "nf_stream",
        }
    }

    /// Record a client stream opened
    pub fn session_opened(&self) {
        counter!(format!("{}.sessions.opened", self.prefix)).increment(1);
        gauge!(format!("{}.sessions.active", self.prefix)).increment(1.0);
    }

    /// Record a client stream released
    pub fn session_closed(&self, reason: &str) {
        counter!(format!("{}.sessions.closed", self.prefix)).increment(1);
        counter!(format!("{}.sessions.closed.{}", self.prefix, reason)).increment(1);
        gauge!(format!("{}.sessions.active", self.prefix)).decrement(1.0);
    }

    /// Record a stream request turned away before a session existed
    pub fn session_rejected(&self, error_code: &str) {
        counter!(format!("{}.sessions.rejected.{}", self.prefix, error_code)).increment(1);
    }

    pub fn dispatched(&self, report: &DispatchReport) {
        counter!(format!("{}.notifications.dispatched", self.prefix)).increment(1);
        counter!(format!("{}.notifications.delivered", self.prefix))
            .increment(report.delivered as u64);
        if report.failed > 0 {
            counter!(format!("{}.sessions.failed", self.prefix)).increment(report.failed as u64);
        }
    }

    /// Record a buffered message evicted by drop-oldest
    pub fn notification_evicted(&self) {
        counter!(format!("{}.notifications.evicted", self.prefix)).increment(1);
    }

    pub fn notification_dropped(&self, reason: DropReason) {
        counter!(format!("{}.notifications.dropped", self.prefix)).increment(1);
        counter!(format!(
            "{}.notifications.dropped.{}",
            self.prefix,
            reason.as_str()
        ))
        .increment(1);
    }

    /// Record a broker delivery discarded before sequencing
    pub fn malformed_message(&self, kind: &str) {
        counter!(format!("{}.broker.malformed", self.prefix)).increment(1);
        counter!(format!("{}.broker.malformed.{}", self.prefix, kind)).increment(1);
    }

    pub fn broker_reconnect(&self) {
        counter!(format!("{}.broker.reconnects", self.prefix)).increment(1);
    }

    pub fn published(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        counter!(format!("{}.broker.published.{}", self.prefix, outcome)).increment(1);
    }

    /// Record subscription created or torn down
    pub fn subscription_changed(&self, action: &str) {
        counter!(format!("{}.subscriptions.{}", self.prefix, action)).increment(1);
    }

    pub fn active_subscriptions(&self, count: usize) {
        gauge!(format!("{}.subscriptions.active", self.prefix)).set(count as f64);
    }

    /// Record time spent fanning one message out to `sessions` sessions
    pub fn dispatch_latency(&self, duration: std::time::Duration, sessions: usize) {
        histogram!(format!("{}.dispatch.latency_us", self.prefix))
            .record(duration.as_micros() as f64);
        histogram!(format!("{}.dispatch.fan_out", self.prefix)).record(sessions as f64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
