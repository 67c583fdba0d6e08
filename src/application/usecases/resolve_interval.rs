use std::sync::Arc;

use serde::Serialize;

use crate::application::IntervalStore;
use crate::domain::{ChannelId, IntervalMs, IntervalPolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EffectiveInterval {
    pub interval_ms: IntervalMs,
    pub overridden: bool,
}

#[derive(Clone)]
pub struct ResolveIntervalUseCase {
    pub store: Arc<dyn IntervalStore>,
    pub policy: IntervalPolicy,
}

impl ResolveIntervalUseCase {
    pub fn new(store: Arc<dyn IntervalStore>, policy: IntervalPolicy) -> Self {
        Self { store, policy }
    }

    /// Never fails: an unreachable store means "no override".
    pub async fn effective(&self, channel: &ChannelId) -> EffectiveInterval {
        let found = match self.store.get(channel).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(channel = %channel, error = %e, "override lookup failed, using global interval");
                None
            }
        };
        EffectiveInterval {
            interval_ms: self.policy.applicable(found),
            overridden: found.is_some(),
        }
    }
}
