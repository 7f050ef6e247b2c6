use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Raw delivery from the broker, before sequencing
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    /// Channel name as reported by the broker
    pub channel: String,
    /// Opaque payload
    pub payload: Bytes,
    pub received_at: DateTime<Utc>,
}

impl BrokerMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
            received_at: Utc::now(),
        }
    }
}
