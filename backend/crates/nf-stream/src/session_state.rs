use serde::Serialize;

/// Stream session lifecycle.
///
/// `Connecting -> Active -> Draining -> Closed`, or `Active -> Closed` directly
/// when nothing more may be flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Active,
    Draining,
    Closed,
}

impl SessionState {
    /// Whether `enqueue` may add to the buffer
    pub fn accepts_messages(self) -> bool {
        matches!(self, Self::Connecting | Self::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Draining => "draining",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
