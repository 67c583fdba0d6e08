use super::IntervalMs;

/// Global default plus the rule for picking between it and an override.
#[derive(Clone, Copy, Debug)]
pub struct IntervalPolicy {
    pub global: IntervalMs,
}

impl IntervalPolicy {
    pub fn new(global: IntervalMs) -> Self {
        Self { global }
    }

    pub fn applicable(&self, override_ms: Option<IntervalMs>) -> IntervalMs {
        override_ms.unwrap_or(self.global)
    }
}

/// Where a message lands on the channel's timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendSlot {
    Immediate { at_ms: u64 },
    Deferred { at_ms: u64, wait_ms: u64 },
}

impl SendSlot {
    /// `last` may lie in the future when an earlier message is still waiting
    /// for its slot; the next one then queues behind it.
    pub fn plan(last: Option<u64>, now_ms: u64, interval: IntervalMs) -> Self {
        let Some(last) = last else {
            return SendSlot::Immediate { at_ms: now_ms };
        };
        let earliest = last.saturating_add(interval.as_millis());
        if now_ms >= earliest {
            SendSlot::Immediate { at_ms: now_ms }
        } else {
            SendSlot::Deferred {
                at_ms: earliest,
                wait_ms: earliest - now_ms,
            }
        }
    }

    pub fn at_ms(&self) -> u64 {
        match *self {
            SendSlot::Immediate { at_ms } | SendSlot::Deferred { at_ms, .. } => at_ms,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, SendSlot::Immediate { .. })
    }
}
