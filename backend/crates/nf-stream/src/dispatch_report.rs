/// Per-dispatch delivery tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Sessions that buffered the message
    pub delivered: usize,
    /// Sessions that refused it (policy, draining, ordering)
    pub dropped: usize,
    /// Sessions whose enqueue errored and were failed
    pub failed: usize,
}

impl DispatchReport {
    pub fn sessions(&self) -> usize {
        self.delivered + self.dropped + self.failed
    }
}
