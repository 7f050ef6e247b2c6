use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

// Grace window before an idle channel is unsubscribed (milliseconds)
pub const MAX_GRACE_PERIOD_MS: u64 = 300000;
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 5000;

pub const MIN_RECONNECT_INITIAL_DELAY_MS: u64 = 10;
pub const MAX_RECONNECT_INITIAL_DELAY_MS: u64 = 10000;
pub const DEFAULT_RECONNECT_INITIAL_DELAY_MS: u64 = 100;

pub const MIN_RECONNECT_MAX_DELAY_SECS: u64 = 1;
pub const MAX_RECONNECT_MAX_DELAY_SECS: u64 = 300;
pub const DEFAULT_RECONNECT_MAX_DELAY_SECS: u64 = 30;

pub const MIN_RECONNECT_BACKOFF_MULTIPLIER: f64 = 1.0;
pub const MAX_RECONNECT_BACKOFF_MULTIPLIER: f64 = 10.0;
pub const DEFAULT_RECONNECT_BACKOFF_MULTIPLIER: f64 = 2.0;

pub const DEFAULT_RECONNECT_JITTER: bool = true;

pub const MIN_MAX_PAYLOAD_BYTES: usize = 1;
pub const MAX_MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Broker subscription lifecycle settings.
///
/// Reconnection uses exponential backoff with optional jitter, capped at
/// `reconnect_max_delay_secs`, and retries for as long as the channel has
/// sessions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Delay between the last session leaving and the broker unsubscribe
    pub grace_period_ms: u64,
    pub reconnect_initial_delay_ms: u64,
    pub reconnect_max_delay_secs: u64,
    pub reconnect_backoff_multiplier: f64,
    pub reconnect_jitter: bool,
    /// Larger broker payloads are treated as malformed and dropped
    pub max_payload_bytes: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            reconnect_initial_delay_ms: DEFAULT_RECONNECT_INITIAL_DELAY_MS,
            reconnect_max_delay_secs: DEFAULT_RECONNECT_MAX_DELAY_SECS,
            reconnect_backoff_multiplier: DEFAULT_RECONNECT_BACKOFF_MULTIPLIER,
            reconnect_jitter: DEFAULT_RECONNECT_JITTER,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl SubscriptionConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.grace_period_ms > MAX_GRACE_PERIOD_MS {
            return Err(ConfigError::subscription(format!(
                "subscription.grace_period_ms must be 0-{}, got {}",
                MAX_GRACE_PERIOD_MS, self.grace_period_ms
            )));
        }

        if self.reconnect_initial_delay_ms < MIN_RECONNECT_INITIAL_DELAY_MS
            || self.reconnect_initial_delay_ms > MAX_RECONNECT_INITIAL_DELAY_MS
        {
            return Err(ConfigError::subscription(format!(
                "subscription.reconnect_initial_delay_ms must be {}-{}, got {}",
                MIN_RECONNECT_INITIAL_DELAY_MS,
                MAX_RECONNECT_INITIAL_DELAY_MS,
                self.reconnect_initial_delay_ms
            )));
        }

        if self.reconnect_max_delay_secs < MIN_RECONNECT_MAX_DELAY_SECS
            || self.reconnect_max_delay_secs > MAX_RECONNECT_MAX_DELAY_SECS
        {
            return Err(ConfigError::subscription(format!(
                "subscription.reconnect_max_delay_secs must be {}-{}, got {}",
                MIN_RECONNECT_MAX_DELAY_SECS,
                MAX_RECONNECT_MAX_DELAY_SECS,
                self.reconnect_max_delay_secs
            )));
        }

        if self.reconnect_initial_delay_ms > self.reconnect_max_delay_secs * 1000 {
            return Err(ConfigError::subscription(format!(
                "subscription.reconnect_initial_delay_ms ({}) must not exceed reconnect_max_delay_secs ({}s)",
                self.reconnect_initial_delay_ms, self.reconnect_max_delay_secs
            )));
        }

        if self.reconnect_backoff_multiplier < MIN_RECONNECT_BACKOFF_MULTIPLIER
            || self.reconnect_backoff_multiplier > MAX_RECONNECT_BACKOFF_MULTIPLIER
        {
            return Err(ConfigError::subscription(format!(
                "subscription.reconnect_backoff_multiplier must be {}-{}, got {}",
                MIN_RECONNECT_BACKOFF_MULTIPLIER,
                MAX_RECONNECT_BACKOFF_MULTIPLIER,
                self.reconnect_backoff_multiplier
            )));
        }

        if self.max_payload_bytes < MIN_MAX_PAYLOAD_BYTES
            || self.max_payload_bytes > MAX_MAX_PAYLOAD_BYTES
        {
            return Err(ConfigError::subscription(format!(
                "subscription.max_payload_bytes must be {}-{}, got {}",
                MIN_MAX_PAYLOAD_BYTES, MAX_MAX_PAYLOAD_BYTES, self.max_payload_bytes
            )));
        }

        Ok(())
    }
}
