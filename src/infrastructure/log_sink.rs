use async_trait::async_trait;

use crate::application::{AppResult, MessageSink};
use crate::domain::OutboundMessage;

/// Stand-in sink for running without a chat platform attached.
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for LogSink {
    async fn send(&self, message: &OutboundMessage) -> AppResult<()> {
        tracing::info!(
            channel = %message.channel,
            payload = %message.payload,
            "SEND"
        );
        Ok(())
    }
}
