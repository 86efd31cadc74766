//! Drift classification results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::severity::DriftSeverity;

/// Classified kinds of deviation between code and specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    MissingImplementation,
    SignatureMismatch,
    BehaviorDeviation,
    DocumentationStale,
    DependencyDrift,
    ApiBreakingChange,
}

impl DriftKind {
    pub const ALL: [DriftKind; 6] = [
        DriftKind::MissingImplementation,
        DriftKind::SignatureMismatch,
        DriftKind::BehaviorDeviation,
        DriftKind::DocumentationStale,
        DriftKind::DependencyDrift,
        DriftKind::ApiBreakingChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingImplementation => "missing_implementation",
            Self::SignatureMismatch => "signature_mismatch",
            Self::BehaviorDeviation => "behavior_deviation",
            Self::DocumentationStale => "documentation_stale",
            Self::DependencyDrift => "dependency_drift",
            Self::ApiBreakingChange => "api_breaking_change",
        }
    }

    /// Short human label, used in alert titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingImplementation => "Missing implementation",
            Self::SignatureMismatch => "Signature mismatch",
            Self::BehaviorDeviation => "Behavior deviation",
            Self::DocumentationStale => "Stale documentation",
            Self::DependencyDrift => "Dependency drift",
            Self::ApiBreakingChange => "Breaking API change",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for DriftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftItem {
    pub kind: DriftKind,
    pub severity: DriftSeverity,
    /// The specification element this item was derived from.
    pub element_id: String,
    pub description: String,
    /// Heuristic confidence in [0, 1]. Items below the configured
    /// minimum never leave the detector.
    pub confidence: f64,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

/// Immutable result of one detector run over one file.
///
/// Carries no timestamp: reports for identical inputs compare equal,
/// which the alerting and test layers rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub file: PathBuf,
    pub spec_ref: String,
    pub items: Vec<DriftItem>,
    /// Informational note when the report is empty for a reason worth
    /// surfacing (e.g. no specification loaded for the path).
    #[serde(default)]
    pub note: Option<String>,
}

impl DriftReport {
    pub fn new(file: impl Into<PathBuf>, spec_ref: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            spec_ref: spec_ref.into(),
            items: Vec::new(),
            note: None,
        }
    }

    /// Empty report for a path with no loaded specification.
    pub fn without_spec(file: impl Into<PathBuf>) -> Self {
        let mut report = Self::new(file, "");
        report.note = Some("no specification loaded for this path".to_string());
        report
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Highest severity across all items.
    pub fn max_severity(&self) -> Option<DriftSeverity> {
        self.items.iter().map(|i| i.severity).max()
    }

    /// Item count per kind, in [`DriftKind::ALL`] order. Used by summaries.
    pub fn count_by_kind(&self) -> Vec<(DriftKind, usize)> {
        DriftKind::ALL
            .iter()
            .map(|k| (*k, self.items.iter().filter(|i| i.kind == *k).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: DriftKind, severity: DriftSeverity) -> DriftItem {
        DriftItem {
            kind,
            severity,
            element_id: "el".to_string(),
            description: String::new(),
            confidence: 0.9,
            expected: None,
            actual: None,
            line: None,
        }
    }

    #[test]
    fn max_severity_picks_highest() {
        let mut report = DriftReport::new("src/a.rs", "spec");
        report.items.push(item(DriftKind::SignatureMismatch, DriftSeverity::Medium));
        report.items.push(item(DriftKind::ApiBreakingChange, DriftSeverity::Critical));
        assert_eq!(report.max_severity(), Some(DriftSeverity::Critical));
    }

    #[test]
    fn without_spec_is_empty_with_note() {
        let report = DriftReport::without_spec("src/a.rs");
        assert!(report.is_empty());
        assert!(report.note.is_some());
    }

    #[test]
    fn kind_text_roundtrip() {
        for kind in DriftKind::ALL {
            assert_eq!(DriftKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DriftKind::parse("unknown"), None);
    }
}
