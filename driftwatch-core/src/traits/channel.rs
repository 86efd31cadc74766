//! Notification channel capability.

use crate::errors::ChannelError;
use crate::types::Alert;

/// One way of delivering an alert to the outside world.
///
/// Implementations must be callable from any thread; the dispatcher
/// fans out across channels concurrently and records each outcome in
/// the alert's delivery log. A handler that blocks past the configured
/// per-channel timeout is recorded as failed but left to finish on its
/// own thread rather than being killed.
pub trait ChannelHandler: Send + Sync {
    /// Stable channel name, referenced by alert rules.
    fn name(&self) -> &str;

    fn send(&self, alert: &Alert) -> Result<(), ChannelError>;
}
