use crate::{CoreError, ErrorLocation};

use std::panic::Location;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique stream session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[track_caller]
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let uuid = Uuid::parse_str(value).map_err(|_| CoreError::InvalidSessionId {
            value: value.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(Self(uuid))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
