use crate::SubscriptionState;

use nf_core::ChannelId;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of one channel for introspection
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub channel: ChannelId,
    pub sessions: usize,
    /// `None` when the subscription was already torn down
    pub subscription: Option<SubscriptionState>,
    pub last_sequence: u64,
    pub reconnects: u64,
    pub created_at: Option<DateTime<Utc>>,
    /// When the current broker subscription was created
    pub subscribed_at: Option<DateTime<Utc>>,
}
