use crate::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker connection failed: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Publish to '{channel}' failed: {message} {location}")]
    Publish {
        channel: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed broker message: {message} {location}")]
    Malformed {
        message: String,
        location: ErrorLocation,
    },
}

impl BrokerError {
    #[track_caller]
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::Connect {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn publish<C: Into<String>, S: Into<String>>(channel: C, message: S) -> Self {
        Self::Publish {
            channel: channel.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Per-message failure; the listen handle is still usable
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

pub type BrokerResult<T> = std::result::Result<T, BrokerError>;
