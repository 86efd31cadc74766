//! Severity scales for drift items and alerts.
//!
//! Drift items use the detector's five-level scale; alerts use the
//! four-level operator scale. The two are related but not identical:
//! alert rules express thresholds ("at least Warning"), so both enums
//! derive `Ord` with ascending severity.

use serde::{Deserialize, Serialize};

/// Severity of an individual drift item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DriftSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl DriftSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an alert as seen by operators and routing rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Parse the stored text form back into a severity.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DriftSeverity> for AlertSeverity {
    fn from(s: DriftSeverity) -> Self {
        match s {
            DriftSeverity::Critical => Self::Critical,
            DriftSeverity::High => Self::Error,
            DriftSeverity::Medium => Self::Warning,
            DriftSeverity::Low | DriftSeverity::Info => Self::Info,
        }
    }
}
