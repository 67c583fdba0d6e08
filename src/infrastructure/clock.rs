use async_trait::async_trait;
use tokio::time::{Duration, Instant};

use crate::application::Clock;

/// Milliseconds since the clock was created, on tokio's timer (pausable in tests).
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    async fn sleep_until_ms(&self, at_ms: u64) {
        tokio::time::sleep_until(self.origin + Duration::from_millis(at_ms)).await;
    }
}
