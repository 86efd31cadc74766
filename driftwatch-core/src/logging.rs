//! Logging bootstrap.
//!
//! The embedding product calls [`init`] once at startup. Filtering is
//! controlled through the `DRIFTWATCH_LOG` environment variable using
//! the usual `tracing_subscriber` directive syntax.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call more than
/// once; later calls are no-ops.
pub fn init() {
    init_with_filter("info");
}

/// Initialize with an explicit default filter, still overridable
/// through `DRIFTWATCH_LOG`.
pub fn init_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_env("DRIFTWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
