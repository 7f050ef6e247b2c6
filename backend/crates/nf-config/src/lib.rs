mod broker_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod overflow_policy;
mod server_config;
mod stream_config;
mod subscription_config;

pub use broker_config::{BrokerConfig, BrokerKind};
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use overflow_policy::OverflowPolicy;
pub use server_config::ServerConfig;
pub use stream_config::StreamConfig;
pub use subscription_config::SubscriptionConfig;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const MIN_PORT: u16 = 1024;

const DEFAULT_MAX_SESSIONS: usize = 10000;
const MIN_MAX_SESSIONS: usize = 1;
const MAX_MAX_SESSIONS: usize = 100000;

const DEFAULT_BROKER_URL: &str = "redis://127.0.0.1:6379";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;

const CONFIG_DIR_ENV: &str = "NF_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".nf";
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(test)]
mod tests;
