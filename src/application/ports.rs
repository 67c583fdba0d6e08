use async_trait::async_trait;

use crate::domain::{ChannelId, IntervalMs, IntervalOverride, OutboundMessage};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid channel: {0}")]
    InvalidChannel(#[from] crate::domain::ChannelIdError),
    #[error("invalid interval: {0} (must be a non-negative number of milliseconds)")]
    InvalidInterval(i64),
    #[error("permission denied: {0} may not change channel intervals")]
    PermissionDenied(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<crate::domain::IntervalError> for AppError {
    fn from(e: crate::domain::IntervalError) -> Self {
        match e {
            crate::domain::IntervalError::Negative(v) => AppError::InvalidInterval(v),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Durable per-channel overrides.
#[async_trait]
pub trait IntervalStore: Send + Sync {
    async fn get(&self, channel: &ChannelId) -> AppResult<Option<IntervalMs>>;

    /// Upsert: one record per channel, updated in place after the first write.
    async fn set(&self, channel: &ChannelId, interval: IntervalMs) -> AppResult<IntervalOverride>;
}

/// Monotonic milliseconds plus a non-blocking wait.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
    async fn sleep_until_ms(&self, at_ms: u64);
}

/// Where delayed messages get re-emitted once their slot arrives.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> AppResult<()>;
}
