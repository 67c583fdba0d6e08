pub mod rate_gate;
pub mod resolve_interval;
pub mod set_interval;

pub use rate_gate::{RateGate, SendLedger};
pub use resolve_interval::{EffectiveInterval, ResolveIntervalUseCase};
pub use set_interval::SetIntervalUseCase;
