use crate::ConfigError;

use std::str::FromStr;

use serde::Deserialize;

/// What a stream session does when its buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest buffered message and accept the new one
    #[default]
    DropOldest,
    /// Reject the new message
    DropNewest,
    /// Close the session as a slow consumer
    Disconnect,
}

impl FromStr for OverflowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop_oldest" => Ok(Self::DropOldest),
            "drop_newest" => Ok(Self::DropNewest),
            "disconnect" => Ok(Self::Disconnect),
            other => Err(ConfigError::stream(format!(
                "stream.overflow_policy must be drop_oldest, drop_newest or disconnect, got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DropOldest => f.write_str("drop_oldest"),
            Self::DropNewest => f.write_str("drop_newest"),
            Self::Disconnect => f.write_str("disconnect"),
        }
    }
}
