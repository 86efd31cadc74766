//! Log channel: alerts become tracing events.

use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::{Alert, AlertSeverity};
use tracing::{error, info, warn};

pub struct LogChannel;

impl ChannelHandler for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        match alert.severity {
            AlertSeverity::Critical | AlertSeverity::Error => {
                error!(alert_id = alert.id, severity = %alert.severity,
                    title = %alert.title, "{}", alert.message);
            }
            AlertSeverity::Warning => {
                warn!(alert_id = alert.id, title = %alert.title, "{}", alert.message);
            }
            AlertSeverity::Info => {
                info!(alert_id = alert.id, title = %alert.title, "{}", alert.message);
            }
        }
        Ok(())
    }
}
