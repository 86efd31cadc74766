//! Channel delivery errors — isolated per channel, recorded in the
//! alert's delivery log, never propagated to sibling channels.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("{channel} delivery failed: {message}")]
    SendFailed { channel: String, message: String },

    #[error("{channel} did not respond within {timeout_ms}ms")]
    Timeout { channel: String, timeout_ms: u64 },

    #[error("{channel} is not configured")]
    NotConfigured { channel: String },
}
