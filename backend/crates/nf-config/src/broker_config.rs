use crate::{ConfigError, ConfigErrorResult, DEFAULT_BROKER_URL};

use std::str::FromStr;

use serde::Deserialize;

/// Which broker backend to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerKind {
    /// In-process broker; only this server's publishers reach its subscribers
    #[default]
    Memory,
    /// Redis pub/sub
    Redis,
}

impl FromStr for BrokerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(ConfigError::broker(format!(
                "broker.kind must be 'memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for BrokerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Redis => f.write_str("redis"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub kind: BrokerKind,
    /// Connection URL, used by the redis backend
    pub url: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            kind: BrokerKind::default(),
            url: String::from(DEFAULT_BROKER_URL),
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.kind == BrokerKind::Redis
            && !(self.url.starts_with("redis://") || self.url.starts_with("rediss://"))
        {
            return Err(ConfigError::broker(format!(
                "broker.url must start with redis:// or rediss:// for the redis backend, got '{}'",
                self.url
            )));
        }

        Ok(())
    }

    /// URL with any password masked, safe to log
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***{}", &self.url[..scheme_end], &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }
}
