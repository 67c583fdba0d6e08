use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque conversation key (group / guild id on the host platform).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    pub fn parse(s: &str) -> Result<Self, ChannelIdError> {
        if s.trim().is_empty() {
            return Err(ChannelIdError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ChannelIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(value: ChannelId) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChannelIdError {
    #[error("channel id must not be empty")]
    Empty,
}

/// Identity of whoever invokes an admin command.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimum gap between two permitted sends, in milliseconds. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalMs(u64);

impl IntervalMs {
    pub const ZERO: IntervalMs = IntervalMs(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Values coming from users or config files are signed; reject anything below zero.
    pub fn try_from_i64(v: i64) -> Result<Self, IntervalError> {
        u64::try_from(v)
            .map(Self)
            .map_err(|_| IntervalError::Negative(v))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IntervalMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("interval must be >= 0, got {0}")]
    Negative(i64),
}
