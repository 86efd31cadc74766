//! The alert system: durable, deduplicated, multi-channel notifications.
//!
//! Detection results become [`AlertEvent`](driftwatch_core::types::AlertEvent)s,
//! which the [`AlertSystem`] fingerprints, rate-limits, suppresses, persists,
//! and fans out to subscribed channels. One channel's failure never touches
//! another's delivery.

pub mod channels;
pub mod dispatch;
pub mod fingerprint;
pub mod rate_limit;
pub mod rules;
pub mod system;

pub use channels::ChannelRegistry;
pub use system::{AlertSystem, Outcome, ReportOutcome};
