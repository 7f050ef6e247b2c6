use crate::{
    BrokerConfig, CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, LoggingConfig, ServerConfig, StreamConfig, SubscriptionConfig,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub broker: BrokerConfig,
    pub stream: StreamConfig,
    pub subscription: SubscriptionConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for NF_CONFIG_DIR env var, else use ./.nf/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply NF_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: NF_CONFIG_DIR env var > ./.nf/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.broker.validate()?;
        self.stream.validate()?;
        self.subscription.validate()?;

        if let Some(ref file) = self.logging.file
            && (Path::new(file).is_absolute() || file.contains(".."))
        {
            return Err(ConfigError::config(
                "logging.file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.subscription.grace_period_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.stream.drain_timeout_ms)
    }

    /// Log configuration summary (never logs broker credentials).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (max {} sessions)",
            self.server.host, self.server.port, self.server.max_sessions
        );
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stdout")
        );
        info!(
            "  broker: {} ({})",
            self.broker.kind,
            self.broker.redacted_url()
        );
        info!(
            "  stream: buffer={}, overflow={}, drain={}ms, transport={}, keep_alive={}s",
            self.stream.buffer_capacity,
            self.stream.overflow_policy,
            self.stream.drain_timeout_ms,
            self.stream.transport_buffer,
            self.stream.keep_alive_secs
        );
        info!(
            "  subscription: grace={}ms, reconnect={}ms..{}s x{} (jitter: {}), max_payload={}B",
            self.subscription.grace_period_ms,
            self.subscription.reconnect_initial_delay_ms,
            self.subscription.reconnect_max_delay_secs,
            self.subscription.reconnect_backoff_multiplier,
            self.subscription.reconnect_jitter,
            self.subscription.max_payload_bytes
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("NF_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("NF_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse("NF_SERVER_MAX_SESSIONS", &mut self.server.max_sessions);

        // Logging
        Self::apply_env_parse("NF_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("NF_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("NF_LOG_FILE", &mut self.logging.file);

        // Broker
        Self::apply_env_parse("NF_BROKER_KIND", &mut self.broker.kind);
        Self::apply_env_string("NF_BROKER_URL", &mut self.broker.url);

        // Stream
        Self::apply_env_parse(
            "NF_STREAM_BUFFER_CAPACITY",
            &mut self.stream.buffer_capacity,
        );
        Self::apply_env_parse(
            "NF_STREAM_OVERFLOW_POLICY",
            &mut self.stream.overflow_policy,
        );
        Self::apply_env_parse(
            "NF_STREAM_DRAIN_TIMEOUT_MS",
            &mut self.stream.drain_timeout_ms,
        );
        Self::apply_env_parse(
            "NF_STREAM_TRANSPORT_BUFFER",
            &mut self.stream.transport_buffer,
        );
        Self::apply_env_parse(
            "NF_STREAM_KEEP_ALIVE_SECS",
            &mut self.stream.keep_alive_secs,
        );

        // Subscription
        Self::apply_env_parse(
            "NF_SUB_GRACE_PERIOD_MS",
            &mut self.subscription.grace_period_ms,
        );
        Self::apply_env_parse(
            "NF_SUB_RECONNECT_INITIAL_DELAY_MS",
            &mut self.subscription.reconnect_initial_delay_ms,
        );
        Self::apply_env_parse(
            "NF_SUB_RECONNECT_MAX_DELAY_SECS",
            &mut self.subscription.reconnect_max_delay_secs,
        );
        Self::apply_env_parse(
            "NF_SUB_RECONNECT_BACKOFF_MULTIPLIER",
            &mut self.subscription.reconnect_backoff_multiplier,
        );
        Self::apply_env_bool(
            "NF_SUB_RECONNECT_JITTER",
            &mut self.subscription.reconnect_jitter,
        );
        Self::apply_env_parse(
            "NF_SUB_MAX_PAYLOAD_BYTES",
            &mut self.subscription.max_payload_bytes,
        );
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values.
    /// Unparseable values are ignored with a warning.
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name) {
            match val.parse() {
                Ok(parsed) => *target = parsed,
                Err(_) => warn!("Ignoring {var_name}={val}: not a valid value"),
            }
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
