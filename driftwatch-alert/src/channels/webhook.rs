//! Webhook channel: JSON POST of the alert.

use std::time::Duration;

use driftwatch_core::config::WebhookSettings;
use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::Alert;

pub struct WebhookChannel {
    settings: WebhookSettings,
}

impl WebhookChannel {
    pub fn new(settings: WebhookSettings) -> Self {
        Self { settings }
    }

    fn fail(&self, message: String) -> ChannelError {
        ChannelError::SendFailed {
            channel: "webhook".to_string(),
            message,
        }
    }

    /// Blocking HTTP POST driven through a current-thread runtime:
    /// channel handlers are sync by contract, the HTTP stack is async.
    fn post(&self, body: serde_json::Value) -> Result<(), ChannelError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.fail(format!("runtime error: {e}")))?;

        let timeout = Duration::from_millis(self.settings.timeout_ms.unwrap_or(10_000));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| self.fail(format!("client error: {e}")))?;

        let url = self.settings.url.clone();
        let bearer = self.settings.bearer_token.clone();

        rt.block_on(async {
            let mut request = client.post(&url).json(&body);
            if let Some(token) = &bearer {
                request = request.header("Authorization", format!("Bearer {token}"));
            }
            let response = request
                .send()
                .await
                .map_err(|e| self.fail(format!("HTTP error: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(self.fail(format!("endpoint returned {status}: {body}")));
            }
            Ok(())
        })
    }
}

impl ChannelHandler for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        let body = serde_json::to_value(alert).map_err(|e| self.fail(e.to_string()))?;
        self.post(body)
    }
}
