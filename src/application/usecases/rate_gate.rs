use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::application::usecases::ResolveIntervalUseCase;
use crate::application::{AppError, AppResult, Clock, MessageSink};
use crate::domain::{ChannelId, GateDecision, IntervalMs, OutboundMessage, SendSlot};

const DEFAULT_PRUNE_THRESHOLD: usize = 1024;

/// Last permitted (or reserved) send time of one channel. The tokio mutex is
/// fair, so callers on a channel are planned in the order they queued on it.
type Lane = Arc<tokio::sync::Mutex<Option<u64>>>;

/// Last-send bookkeeping per channel. Lives as long as the gate.
pub struct SendLedger {
    lanes: Mutex<HashMap<ChannelId, Lane>>,
    longest_interval_ms: AtomicU64,
    prune_threshold: usize,
}

impl Default for SendLedger {
    fn default() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }
}

impl SendLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle channels are swept when a new channel arrives and at least
    /// `threshold` are already tracked.
    pub fn with_prune_threshold(threshold: usize) -> Self {
        Self {
            lanes: Mutex::new(HashMap::new()),
            longest_interval_ms: AtomicU64::new(0),
            prune_threshold: threshold,
        }
    }

    fn lane(&self, channel: &ChannelId, now_ms: u64) -> AppResult<Lane> {
        let mut lanes = self
            .lanes
            .lock()
            .map_err(|_| AppError::Storage("send ledger lock poisoned".into()))?;
        if let Some(lane) = lanes.get(channel) {
            return Ok(Arc::clone(lane));
        }
        if lanes.len() >= self.prune_threshold {
            self.prune(&mut lanes, now_ms);
        }
        let lane = Lane::default();
        lanes.insert(channel.clone(), Arc::clone(&lane));
        Ok(lane)
    }

    /// Drops channels nobody is reserving on whose last slot is older than the
    /// longest interval ever applied.
    fn prune(&self, lanes: &mut HashMap<ChannelId, Lane>, now_ms: u64) {
        let horizon = self.longest_interval_ms.load(Ordering::Relaxed);
        let before = lanes.len();
        lanes.retain(|_, lane| {
            if Arc::strong_count(lane) > 1 {
                return true;
            }
            match lane.try_lock() {
                Ok(last) => last.is_some_and(|at| at.saturating_add(horizon) > now_ms),
                Err(_) => true,
            }
        });
        tracing::debug!(pruned = before - lanes.len(), tracked = lanes.len(), "send ledger pruned");
    }

    fn commit(&self, last: &mut Option<u64>, now_ms: u64, interval: IntervalMs) -> SendSlot {
        self.longest_interval_ms
            .fetch_max(interval.as_millis(), Ordering::Relaxed);
        let slot = SendSlot::plan(*last, now_ms, interval);
        *last = Some(slot.at_ms());
        slot
    }

    pub fn last_send(&self, channel: &ChannelId) -> Option<u64> {
        let lane = self.lanes.lock().ok()?.get(channel).cloned()?;
        let last = lane.try_lock().ok()?;
        *last
    }

    pub fn tracked(&self) -> usize {
        self.lanes.lock().map(|l| l.len()).unwrap_or(0)
    }
}

pub struct RateGate {
    resolver: ResolveIntervalUseCase,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn MessageSink>,
    ledger: SendLedger,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl RateGate {
    pub fn new(
        resolver: ResolveIntervalUseCase,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            resolver,
            clock,
            sink,
            ledger: SendLedger::new(),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.ledger = SendLedger::with_prune_threshold(threshold);
        self
    }

    /// Reserve the next slot for `channel` using the gate's clock.
    pub async fn reserve(&self, channel: &str) -> AppResult<SendSlot> {
        let entered_ms = self.clock.now_ms();
        self.reserve_with(channel, entered_ms, || self.clock.now_ms().max(entered_ms))
            .await
    }

    /// Same as [`RateGate::reserve`] with a caller-supplied timestamp.
    pub async fn reserve_at(&self, channel: &str, now_ms: u64) -> AppResult<SendSlot> {
        self.reserve_with(channel, now_ms, || now_ms).await
    }

    /// The channel's lane is held across the override lookup, so a slow store
    /// cannot let a later call overtake an earlier one.
    async fn reserve_with(
        &self,
        channel: &str,
        entered_ms: u64,
        now_ms: impl FnOnce() -> u64,
    ) -> AppResult<SendSlot> {
        let channel = ChannelId::parse(channel)?;
        let lane = self.ledger.lane(&channel, entered_ms)?;
        let mut last = lane.lock().await;
        let interval = self.resolver.effective(&channel).await.interval_ms;
        Ok(self.ledger.commit(&mut last, now_ms(), interval))
    }

    /// Host hook for "about to send". Delayed messages are re-emitted through
    /// the sink once their slot arrives; the host must drop its own copy.
    pub async fn on_outbound_message(&self, message: OutboundMessage) -> GateDecision {
        let slot = match self.reserve(&message.channel).await {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(channel = %message.channel, error = %e, "rate gate bypassed");
                return GateDecision::Proceed;
            }
        };

        match slot {
            SendSlot::Immediate { at_ms } => {
                tracing::debug!(channel = %message.channel, at_ms, "send permitted");
                GateDecision::Proceed
            }
            SendSlot::Deferred { at_ms, wait_ms } => {
                tracing::info!(channel = %message.channel, wait_ms, "send delayed");
                self.schedule(message, at_ms);
                GateDecision::Suppress {
                    scheduled_at_ms: at_ms,
                }
            }
        }
    }

    fn schedule(&self, message: OutboundMessage, at_ms: u64) {
        let clock = Arc::clone(&self.clock);
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            clock.sleep_until_ms(at_ms).await;
            if let Err(e) = sink.send(&message).await {
                // no retry: the slot is spent either way
                tracing::error!(channel = %message.channel, error = %e, "delayed send failed");
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    pub fn last_send(&self, channel: &str) -> Option<u64> {
        ChannelId::parse(channel)
            .ok()
            .and_then(|c| self.ledger.last_send(&c))
    }

    /// Channels with bookkeeping currently held.
    pub fn tracked_channels(&self) -> usize {
        self.ledger.tracked()
    }

    /// Delayed sends still waiting for their slot.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .map(|p| p.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Abandons every delayed send that has not gone out yet.
    pub fn shutdown(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            let dropped = pending.iter().filter(|h| !h.is_finished()).count();
            for h in pending.drain(..) {
                h.abort();
            }
            if dropped > 0 {
                tracing::warn!(dropped, "rate gate shut down with delayed sends in flight");
            }
        }
    }
}

impl Drop for RateGate {
    fn drop(&mut self) {
        self.shutdown();
    }
}
