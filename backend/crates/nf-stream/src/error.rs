use nf_core::{BrokerError, CoreError, SessionId};

use std::panic::Location;

use axum::http::StatusCode;
use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Invalid channel: {source} {location}")]
    InvalidChannel {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("Session limit exceeded: {current} sessions (max: {max}) {location}")]
    SessionLimitExceeded {
        current: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Service is shutting down {location}")]
    ShuttingDown { location: ErrorLocation },

    #[error("Session {session_id} disconnected: buffer of {capacity} full, client too slow {location}")]
    SlowConsumer {
        session_id: SessionId,
        capacity: usize,
        location: ErrorLocation,
    },

    #[error("Session {session_id} failed: {reason} {location}")]
    SessionFailed {
        session_id: SessionId,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Session {session_id} state lock poisoned {location}")]
    SessionPoisoned {
        session_id: SessionId,
        location: ErrorLocation,
    },

    #[error("Session not found: {session_id} {location}")]
    SessionNotFound {
        session_id: String,
        location: ErrorLocation,
    },

    #[error("Payload of {size} bytes exceeds limit of {max} bytes {location}")]
    PayloadTooLarge {
        size: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Broker error: {source} {location}")]
    Broker {
        #[source]
        source: BrokerError,
        location: ErrorLocation,
    },
}

impl StreamError {
    #[track_caller]
    pub fn session_limit(current: usize, max: usize) -> Self {
        Self::SessionLimitExceeded {
            current,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn shutting_down() -> Self {
        Self::ShuttingDown {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn slow_consumer(session_id: SessionId, capacity: usize) -> Self {
        Self::SlowConsumer {
            session_id,
            capacity,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_failed<S: Into<String>>(session_id: SessionId, reason: S) -> Self {
        Self::SessionFailed {
            session_id,
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_poisoned(session_id: SessionId) -> Self {
        Self::SessionPoisoned {
            session_id,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_not_found<S: Into<String>>(session_id: S) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn payload_too_large(size: usize, max: usize) -> Self {
        Self::PayloadTooLarge {
            size,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidChannel { .. } => "INVALID_CHANNEL",
            Self::SessionLimitExceeded { .. } => "SESSION_LIMIT",
            Self::ShuttingDown { .. } => "SHUTTING_DOWN",
            Self::SlowConsumer { .. } => "SLOW_CONSUMER",
            Self::SessionFailed { .. } => "SESSION_FAILED",
            Self::SessionPoisoned { .. } => "INTERNAL_ERROR",
            Self::SessionNotFound { .. } => "NOT_FOUND",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Broker { .. } => "BROKER_UNAVAILABLE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidChannel { .. } | Self::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::SessionLimitExceeded { .. } | Self::ShuttingDown { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Broker { .. } => StatusCode::BAD_GATEWAY,
            Self::SlowConsumer { .. }
            | Self::SessionFailed { .. }
            | Self::SessionPoisoned { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for StreamError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        Self::InvalidChannel {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BrokerError> for StreamError {
    #[track_caller]
    fn from(source: BrokerError) -> Self {
        Self::Broker {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
