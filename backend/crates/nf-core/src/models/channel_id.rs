use crate::{CoreError, ErrorLocation, Result as CoreErrorResult};

use std::borrow::Borrow;
use std::panic::Location;

use serde::{Deserialize, Serialize};

pub const MAX_CHANNEL_ID_LENGTH: usize = 128;

/// Name of a notification channel.
///
/// Accepts 1..=128 characters from `[A-Za-z0-9_.:-]`, which keeps ids safe to
/// use as broker channel names and as metric label values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    #[track_caller]
    pub fn parse(value: &str) -> CoreErrorResult<Self> {
        let reason = if value.is_empty() {
            Some("must not be empty")
        } else if value.len() > MAX_CHANNEL_ID_LENGTH {
            Some("must be at most 128 characters")
        } else if !value.chars().all(is_channel_char) {
            Some("may only contain letters, digits, '_', '.', ':' and '-'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidChannelId {
                value: value.to_string(),
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(Self(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_channel_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')
}

impl TryFrom<String> for ChannelId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(channel: ChannelId) -> Self {
        channel.0
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChannelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
