use crate::{ConfigError, ConfigErrorResult, OverflowPolicy};

use serde::Deserialize;

// Session buffer constraints
pub const MIN_BUFFER_CAPACITY: usize = 1;
pub const MAX_BUFFER_CAPACITY: usize = 65536;
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

// Drain timeout constraints (milliseconds)
pub const MAX_DRAIN_TIMEOUT_MS: u64 = 60000;
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5000;

// Transport queue between flush task and HTTP body
pub const MIN_TRANSPORT_BUFFER: usize = 1;
pub const MAX_TRANSPORT_BUFFER: usize = 1024;
pub const DEFAULT_TRANSPORT_BUFFER: usize = 16;

// SSE keep-alive constraints (seconds)
pub const MIN_KEEP_ALIVE_SECS: u64 = 1;
pub const MAX_KEEP_ALIVE_SECS: u64 = 300;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

/// Per-session stream settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Pending messages held per session
    pub buffer_capacity: usize,
    /// Policy applied when the buffer is full
    pub overflow_policy: OverflowPolicy,
    /// How long a draining session may keep flushing
    pub drain_timeout_ms: u64,
    /// Events queued between the flush task and the HTTP body
    pub transport_buffer: usize,
    /// Interval between SSE keep-alive comments
    pub keep_alive_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
            transport_buffer: DEFAULT_TRANSPORT_BUFFER,
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.buffer_capacity < MIN_BUFFER_CAPACITY
            || self.buffer_capacity > MAX_BUFFER_CAPACITY
        {
            return Err(ConfigError::stream(format!(
                "stream.buffer_capacity must be {}-{}, got {}",
                MIN_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY, self.buffer_capacity
            )));
        }

        if self.drain_timeout_ms > MAX_DRAIN_TIMEOUT_MS {
            return Err(ConfigError::stream(format!(
                "stream.drain_timeout_ms must be 0-{}, got {}",
                MAX_DRAIN_TIMEOUT_MS, self.drain_timeout_ms
            )));
        }

        if self.transport_buffer < MIN_TRANSPORT_BUFFER
            || self.transport_buffer > MAX_TRANSPORT_BUFFER
        {
            return Err(ConfigError::stream(format!(
                "stream.transport_buffer must be {}-{}, got {}",
                MIN_TRANSPORT_BUFFER, MAX_TRANSPORT_BUFFER, self.transport_buffer
            )));
        }

        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS || self.keep_alive_secs > MAX_KEEP_ALIVE_SECS
        {
            return Err(ConfigError::stream(format!(
                "stream.keep_alive_secs must be {}-{}, got {}",
                MIN_KEEP_ALIVE_SECS, MAX_KEEP_ALIVE_SECS, self.keep_alive_secs
            )));
        }

        Ok(())
    }
}
