use crate::ErrorLocation;

use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid channel id '{value}': {reason} {location}")]
    InvalidChannelId {
        value: String,
        reason: &'static str,
        location: ErrorLocation,
    },

    #[error("Invalid session id '{value}' {location}")]
    InvalidSessionId {
        value: String,
        location: ErrorLocation,
    },
}

pub type Result<T> = StdResult<T, CoreError>;
