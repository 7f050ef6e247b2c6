use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] nf_config::ConfigError),

    #[error("Broker error: {0}")]
    Broker(#[from] nf_core::BrokerError),

    #[error("Failed to install metrics exporter: {message}")]
    Metrics { message: String },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
