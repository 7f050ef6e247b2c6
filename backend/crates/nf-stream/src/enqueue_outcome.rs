/// Result of offering one message to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Buffered. `evicted` is set when the oldest pending message made room.
    Accepted { evicted: bool },
    Dropped(DropReason),
}

impl EnqueueOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Session is draining or closed
    NotAccepting,
    /// Buffer full under drop-newest
    BufferFull,
    /// Buffer full under disconnect; the session is now closed
    SlowConsumer,
    /// Sequence lower than one already accepted
    OutOfOrder,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAccepting => "not_accepting",
            Self::BufferFull => "buffer_full",
            Self::SlowConsumer => "slow_consumer",
            Self::OutOfOrder => "out_of_order",
        }
    }
}
