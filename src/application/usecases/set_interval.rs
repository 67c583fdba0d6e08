use std::collections::HashSet;
use std::sync::Arc;

use crate::application::{AppError, AppResult, IntervalStore};
use crate::domain::{CallerId, ChannelId, IntervalMs};

pub struct SetIntervalUseCase {
    pub store: Arc<dyn IntervalStore>,
    pub allow_list: HashSet<CallerId>,
}

impl SetIntervalUseCase {
    pub fn new(store: Arc<dyn IntervalStore>, allow_list: impl IntoIterator<Item = CallerId>) -> Self {
        Self {
            store,
            allow_list: allow_list
                .into_iter()
                .filter(|c| !c.0.trim().is_empty())
                .collect(),
        }
    }

    /// Returns the interval now in effect for the channel.
    pub async fn execute(&self, caller: &CallerId, channel: &str, value: i64) -> AppResult<IntervalMs> {
        if !self.allow_list.contains(caller) {
            tracing::warn!(caller = %caller, channel, "set interval denied");
            return Err(AppError::PermissionDenied(caller.to_string()));
        }
        let channel = ChannelId::parse(channel)?;
        let interval = IntervalMs::try_from_i64(value)?;

        let record = self.store.set(&channel, interval).await?;
        tracing::info!(
            caller = %caller,
            channel = %channel,
            interval_ms = record.interval_ms.as_millis(),
            "channel interval updated"
        );
        Ok(record.interval_ms)
    }
}
