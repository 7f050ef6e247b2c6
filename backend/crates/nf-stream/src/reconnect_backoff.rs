use nf_config::SubscriptionConfig;

use std::time::Duration;

/// Exponential backoff for broker reconnects
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Scale each delay by a random factor in 0.5..1.5
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&SubscriptionConfig::default())
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &SubscriptionConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.reconnect_initial_delay_ms),
            max_delay: Duration::from_secs(config.reconnect_max_delay_secs),
            backoff_multiplier: config.reconnect_backoff_multiplier,
            jitter: config.reconnect_jitter,
        }
    }
}

/// Delay sequence for one subscription's reconnect attempts.
///
/// Retries never give up; a successful subscribe calls [`reset`](Self::reset).
#[derive(Debug)]
pub struct ReconnectBackoff {
    policy: ReconnectPolicy,
    delay: Duration,
    attempts: u32,
}

impl ReconnectBackoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let delay = policy.initial_delay;
        Self {
            policy,
            delay,
            attempts: 0,
        }
    }

    /// Delay to wait before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        self.attempts += 1;

        let jittered = if self.policy.jitter {
            let jitter_factor = 0.5 + rand::random::<f64>(); // 0.5 to 1.5
            Duration::from_secs_f64(self.delay.as_secs_f64() * jitter_factor)
        } else {
            self.delay
        };
        let actual_delay = jittered.min(self.policy.max_delay);

        self.delay = Duration::from_secs_f64(
            (self.delay.as_secs_f64() * self.policy.backoff_multiplier)
                .min(self.policy.max_delay.as_secs_f64()),
        );

        actual_delay
    }

    /// Attempts since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.delay = self.policy.initial_delay;
        self.attempts = 0;
    }
}
