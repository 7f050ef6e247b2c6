use crate::{BrokerMessage, ChannelId};

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A sequenced message ready for fan-out.
///
/// Cheap to clone: the payload is reference counted, so every session that
/// receives the notification shares one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub channel: ChannelId,
    /// Assigned at ingress, starts at 1 for each channel subscription
    pub sequence: u64,
    pub payload: Bytes,
    pub received_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(channel: ChannelId, sequence: u64, payload: Bytes) -> Self {
        Self {
            channel,
            sequence,
            payload,
            received_at: Utc::now(),
        }
    }

    /// Sequence a broker delivery for `channel`
    pub fn from_broker(channel: ChannelId, sequence: u64, message: BrokerMessage) -> Self {
        Self {
            channel,
            sequence,
            payload: message.payload,
            received_at: message.received_at,
        }
    }
}
