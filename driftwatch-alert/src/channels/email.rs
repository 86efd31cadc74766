//! Email channel, delivered through an HTTP mail gateway.
//!
//! The channel posts a JSON message to the configured gateway endpoint
//! instead of speaking SMTP; the gateway owns transport, retries, and
//! reputation.

use std::time::Duration;

use driftwatch_core::config::EmailSettings;
use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::Alert;
use serde_json::json;

pub struct EmailChannel {
    settings: EmailSettings,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn fail(&self, message: String) -> ChannelError {
        ChannelError::SendFailed {
            channel: "email".to_string(),
            message,
        }
    }
}

impl ChannelHandler for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        if self.settings.to.is_empty() {
            return Err(ChannelError::NotConfigured {
                channel: "email".to_string(),
            });
        }

        let body = json!({
            "from": self.settings.from,
            "to": self.settings.to,
            "subject": format!("[{}] {}", alert.severity.as_str().to_uppercase(), alert.title),
            "text": format!(
                "{}\n\nOccurrences: {}\nContext: {}",
                alert.message,
                alert.occurrence_count,
                serde_json::to_string_pretty(&alert.context).unwrap_or_default(),
            ),
        });

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.fail(format!("runtime error: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(10_000))
            .build()
            .map_err(|e| self.fail(format!("client error: {e}")))?;

        let endpoint = self.settings.endpoint.clone();
        let api_key = self.settings.api_key.clone();

        rt.block_on(async {
            let mut request = client.post(&endpoint).json(&body);
            if let Some(key) = &api_key {
                request = request.header("Authorization", format!("Bearer {key}"));
            }
            let response = request
                .send()
                .await
                .map_err(|e| self.fail(format!("HTTP error: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(self.fail(format!("gateway returned {status}: {body}")));
            }
            Ok(())
        })
    }
}
