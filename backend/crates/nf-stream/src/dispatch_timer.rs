use crate::{DispatchReport, Metrics};

use std::time::Instant;

/// Measures one fan-out pass, from the session snapshot to the last enqueue
pub struct DispatchTimer<'a> {
    started: Instant,
    metrics: &'a Metrics,
}

impl<'a> DispatchTimer<'a> {
    pub fn start(metrics: &'a Metrics) -> Self {
        Self {
            started: Instant::now(),
            metrics,
        }
    }

    /// Record the pass with its outcome and hand the report back
    pub fn finish(self, report: DispatchReport) -> DispatchReport {
        self.metrics.dispatched(&report);
        self.metrics
            .dispatch_latency(self.started.elapsed(), report.sessions());
        report
    }
}
