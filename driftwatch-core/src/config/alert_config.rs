//! Alerting configuration: suppression, rate limits, channel routing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{AlertKind, AlertSeverity};

/// Routes alerts matching (kind, severity) to a set of channels.
/// Loaded once; rules are evaluated in order and their channel sets
/// are unioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    /// Alerts at or above this severity match.
    pub min_severity: AlertSeverity,
    /// Restrict the rule to one alert kind. None matches every kind.
    #[serde(default)]
    pub kind: Option<AlertKind>,
    /// Channel names, as registered in the channel registry.
    pub channels: Vec<String>,
    /// Per-rule suppression window override.
    #[serde(default)]
    pub suppression_window_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub url: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// HTTP mail-gateway settings. The email channel posts a JSON message
/// to a gateway endpoint rather than speaking SMTP itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertConfig {
    /// Default suppression window, overridable per rule.
    pub suppression_window_secs: Option<u64>,
    /// Per-channel delivery deadline.
    pub channel_timeout_ms: Option<u64>,
    pub rate_per_minute: Option<u32>,
    pub rate_per_hour: Option<u32>,
    /// JSONL sink for the file channel.
    pub alert_file: Option<PathBuf>,
    pub webhook: Option<WebhookSettings>,
    pub email: Option<EmailSettings>,
    pub rules: Vec<AlertRuleConfig>,
}

impl AlertConfig {
    pub fn effective_suppression_window_secs(&self) -> u64 {
        self.suppression_window_secs.unwrap_or(300)
    }

    pub fn effective_channel_timeout_ms(&self) -> u64 {
        self.channel_timeout_ms.unwrap_or(5_000)
    }

    pub fn effective_rate_per_minute(&self) -> u32 {
        self.rate_per_minute.unwrap_or(10)
    }

    pub fn effective_rate_per_hour(&self) -> u32 {
        self.rate_per_hour.unwrap_or(100)
    }

    /// Configured rules, or the built-in log-everything rule.
    pub fn effective_rules(&self) -> Vec<AlertRuleConfig> {
        if self.rules.is_empty() {
            vec![AlertRuleConfig {
                min_severity: AlertSeverity::Info,
                kind: None,
                channels: vec!["log".to_string()],
                suppression_window_secs: None,
            }]
        } else {
            self.rules.clone()
        }
    }
}
