use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{AppError, AppResult, IntervalStore};
use crate::domain::{ChannelId, IntervalMs, IntervalOverride};

#[derive(Clone, Default)]
pub struct InMemoryIntervalStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    overrides: HashMap<ChannelId, IntervalOverride>,
}

impl InMemoryIntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.overrides.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IntervalStore for InMemoryIntervalStore {
    async fn get(&self, channel: &ChannelId) -> AppResult<Option<IntervalMs>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        Ok(inner.overrides.get(channel).map(|o| o.interval_ms))
    }

    async fn set(&self, channel: &ChannelId, interval: IntervalMs) -> AppResult<IntervalOverride> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;

        if let Some(existing) = inner.overrides.get_mut(channel) {
            existing.interval_ms = interval;
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let record = IntervalOverride {
            id: inner.next_id,
            channel_id: channel.clone(),
            interval_ms: interval,
        };
        inner.overrides.insert(channel.clone(), record.clone());
        Ok(record)
    }
}
