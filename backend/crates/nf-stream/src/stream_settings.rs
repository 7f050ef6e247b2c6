use crate::ReconnectPolicy;

use nf_config::{Config, OverflowPolicy};

use std::time::Duration;

/// Runtime settings for the fan-out service
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Concurrent sessions allowed across all channels
    pub max_sessions: usize,
    /// Pending messages held per session
    pub buffer_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    /// How long a draining session may keep flushing
    pub drain_timeout: Duration,
    /// Events queued between a flush task and its HTTP body
    pub transport_buffer: usize,
    pub keep_alive: Duration,
    /// Delay between a channel emptying and its broker unsubscribe
    pub grace_period: Duration,
    pub reconnect: ReconnectPolicy,
    /// Larger broker payloads are dropped as malformed
    pub max_payload_bytes: usize,
}

impl StreamSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_sessions: config.server.max_sessions,
            buffer_capacity: config.stream.buffer_capacity,
            overflow_policy: config.stream.overflow_policy,
            drain_timeout: config.drain_timeout(),
            transport_buffer: config.stream.transport_buffer,
            keep_alive: Duration::from_secs(config.stream.keep_alive_secs),
            grace_period: config.grace_period(),
            reconnect: ReconnectPolicy::from_config(&config.subscription),
            max_payload_bytes: config.subscription.max_payload_bytes,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
