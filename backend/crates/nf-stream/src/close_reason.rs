/// Why a session left `Active`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client went away
    ClientCancelled,
    /// Writing to the transport failed
    TransportError,
    /// Admin or service asked for the session to end
    CloseRequested,
    /// Draining did not finish in time
    DrainTimeout,
    /// Buffer overflowed under the disconnect policy
    SlowConsumer,
    Shutdown,
    Failed(String),
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCancelled => "client_cancelled",
            Self::TransportError => "transport_error",
            Self::CloseRequested => "close_requested",
            Self::DrainTimeout => "drain_timeout",
            Self::SlowConsumer => "slow_consumer",
            Self::Shutdown => "shutdown",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}
