//! The continuous monitor: a per-project scheduling loop that batches
//! change events, respects resource ceilings, fans detection out over
//! a bounded worker pool, and forwards findings to the alert system.
//!
//! The loop survives everything except `stop()` and startup-time
//! configuration errors: per-file failures are logged and retried on a
//! later cycle, never fatal.

pub mod handle;
pub mod lock;
pub mod queue;
pub mod resources;
pub mod scheduler;

pub use handle::{MonitorHandle, MonitorStatus};
pub use queue::{ChangeProducer, ChangeQueue};
pub use resources::default_probe;
pub use scheduler::{Monitor, MonitorDeps};
