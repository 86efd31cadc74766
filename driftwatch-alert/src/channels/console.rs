//! Console channel: human-readable lines on stderr.

use std::io::Write;

use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::Alert;

pub struct ConsoleChannel;

impl ChannelHandler for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        writeln!(
            out,
            "[{}] {}: {} (alert #{}, seen {}x)",
            alert.severity.as_str().to_uppercase(),
            alert.title,
            alert.message,
            alert.id,
            alert.occurrence_count,
        )
        .map_err(|e| ChannelError::SendFailed {
            channel: "console".to_string(),
            message: e.to_string(),
        })
    }
}
