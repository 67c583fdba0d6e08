//! Per-channel minimum interval between messages sent by a chat bot.
//!
//! The [`application::usecases::RateGate`] sits in front of the bot's outbound
//! path and spaces messages out per channel; the interval comes from a per-channel
//! override in an [`application::IntervalStore`] or falls back to a global default.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
