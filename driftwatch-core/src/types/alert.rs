//! Alerts and the events that create them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::drift::{DriftKind, DriftReport};
use super::severity::{AlertSeverity, DriftSeverity};

/// What class of condition an alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Code drifted from a specification.
    Drift,
    /// A file's detection pass failed.
    Scan,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drift => "drift",
            Self::Scan => "scan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "drift" => Some(Self::Drift),
            "scan" => Some(Self::Scan),
            _ => None,
        }
    }
}

/// Outcome of one delivery attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub channel: String,
    pub success: bool,
    #[serde(default)]
    pub detail: Option<String>,
    pub at: i64,
}

/// A persisted, deduplicated alert.
///
/// `id` and `created_at` never change after insertion. `resolved`,
/// `resolution_note`, `occurrence_count`, and `delivery_log` are the
/// mutable lifecycle fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub created_at: i64,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    /// Stable dedup key derived from (kind, file, spec, drift kind).
    pub fingerprint: String,
    pub occurrence_count: u32,
    pub resolved: bool,
    #[serde(default)]
    pub resolution_note: Option<String>,
    #[serde(default)]
    pub delivery_log: Vec<DeliveryRecord>,
}

/// Input to alert creation: one condition worth telling someone about.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// File the condition was observed in. Part of the fingerprint.
    pub file: String,
    /// Spec reference the condition relates to. Part of the fingerprint.
    pub spec_ref: String,
    /// Drift kind, for drift events. Part of the fingerprint.
    pub drift_kind: Option<DriftKind>,
    pub context: BTreeMap<String, String>,
}

impl AlertEvent {
    /// Build one event per distinct drift kind present in a report.
    ///
    /// Grouping by kind keeps fingerprints stable across scans: a file
    /// with three signature mismatches raises one alert, and the next
    /// scan's identical findings are suppressed rather than re-raised.
    pub fn from_report(report: &DriftReport) -> Vec<AlertEvent> {
        let file = report.file.display().to_string();
        let mut events = Vec::new();

        for (kind, count) in report.count_by_kind() {
            let group: Vec<_> = report.items.iter().filter(|i| i.kind == kind).collect();
            let severity = group
                .iter()
                .map(|i| i.severity)
                .max()
                .unwrap_or(DriftSeverity::Info);

            let mut context = BTreeMap::new();
            context.insert("file".to_string(), file.clone());
            context.insert("spec".to_string(), report.spec_ref.clone());
            context.insert("drift_kind".to_string(), kind.as_str().to_string());
            context.insert("item_count".to_string(), count.to_string());
            context.insert(
                "elements".to_string(),
                group
                    .iter()
                    .map(|i| i.element_id.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            );
            let max_confidence = group
                .iter()
                .map(|i| i.confidence)
                .fold(0.0_f64, f64::max);
            context.insert(
                "max_confidence".to_string(),
                format!("{max_confidence:.3}"),
            );

            let message = group
                .iter()
                .map(|i| i.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            events.push(AlertEvent {
                kind: AlertKind::Drift,
                severity: severity.into(),
                title: format!("{} in {}", kind.label(), file),
                message,
                file: file.clone(),
                spec_ref: report.spec_ref.clone(),
                drift_kind: Some(kind),
                context,
            });
        }

        events
    }

    /// Event for a file whose detection pass failed.
    pub fn scan_failure(path: &Path, error: &str) -> AlertEvent {
        let file = path.display().to_string();
        let mut context = BTreeMap::new();
        context.insert("file".to_string(), file.clone());
        context.insert("error".to_string(), error.to_string());
        AlertEvent {
            kind: AlertKind::Scan,
            severity: AlertSeverity::Warning,
            title: format!("Scan failed for {}", file),
            message: error.to_string(),
            file,
            spec_ref: String::new(),
            drift_kind: None,
            context,
        }
    }
}
