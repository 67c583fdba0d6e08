use serde::{Deserialize, Serialize};

use super::ChannelId;

/// A message the bot is about to send. The channel stays a raw string here:
/// hosts may hand us garbage and the gate has to let it through anyway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub payload: String,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// What the host should do with its own send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    /// The gate re-emits the payload itself at `scheduled_at_ms`.
    Suppress { scheduled_at_ms: u64 },
}

impl GateDecision {
    pub fn should_send(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

/// Persisted per-channel override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalOverride {
    pub id: i64,
    pub channel_id: ChannelId,
    pub interval_ms: super::IntervalMs,
}
