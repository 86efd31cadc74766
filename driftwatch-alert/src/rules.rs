//! Rule-based channel routing and suppression windows.

use driftwatch_core::config::{AlertConfig, AlertRuleConfig};
use driftwatch_core::types::{AlertKind, AlertSeverity};

/// The loaded rule set. Rules are evaluated in configuration order;
/// matching rules contribute their channels (unioned, order-preserving)
/// and the first matching rule with a window override wins.
pub struct AlertRules {
    rules: Vec<AlertRuleConfig>,
    default_window_secs: u64,
}

fn matches(rule: &AlertRuleConfig, kind: AlertKind, severity: AlertSeverity) -> bool {
    severity >= rule.min_severity && rule.kind.map_or(true, |k| k == kind)
}

impl AlertRules {
    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            rules: config.effective_rules(),
            default_window_secs: config.effective_suppression_window_secs(),
        }
    }

    /// Channels subscribed to alerts of this (kind, severity).
    pub fn channels_for(&self, kind: AlertKind, severity: AlertSeverity) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for rule in self.rules.iter().filter(|r| matches(r, kind, severity)) {
            for channel in &rule.channels {
                if !out.contains(channel) {
                    out.push(channel.clone());
                }
            }
        }
        out
    }

    /// Suppression window for this (kind, severity).
    pub fn window_for(&self, kind: AlertKind, severity: AlertSeverity) -> u64 {
        self.rules
            .iter()
            .filter(|r| matches(r, kind, severity))
            .find_map(|r| r.suppression_window_secs)
            .unwrap_or(self.default_window_secs)
    }
}
