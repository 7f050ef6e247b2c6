use crate::SessionState;

use nf_core::{ChannelId, SessionId};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-session message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    /// Messages accepted into the buffer
    pub enqueued: u64,
    /// Buffered messages discarded to make room (drop-oldest)
    pub evicted: u64,
    /// Messages refused by `enqueue`
    pub dropped: u64,
    /// Messages handed to the flush task
    pub delivered: u64,
    /// Buffered messages thrown away on close
    pub discarded: u64,
}

/// Snapshot of one session for introspection
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub channel: ChannelId,
    pub state: SessionState,
    pub buffered: usize,
    pub capacity: usize,
    pub counters: SessionCounters,
    pub close_reason: Option<String>,
    pub opened_at: DateTime<Utc>,
}
