//! Detector tuning: confidence weights and the false-positive floor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DriftKind;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectorConfig {
    /// Items below this confidence are dropped before a report leaves
    /// the detector. The single tunable false-positive control.
    pub min_confidence: Option<f64>,
    /// Budget for the optional AI enricher.
    pub enricher_timeout_ms: Option<u64>,
    /// Per-kind confidence weights, keyed by the kind's text form.
    /// Values outside [0, 1] and NaN are sanitized at lookup.
    pub confidence_weights: BTreeMap<String, f64>,
}

impl DetectorConfig {
    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence.unwrap_or(0.3)
    }

    pub fn effective_enricher_timeout_ms(&self) -> u64 {
        self.enricher_timeout_ms.unwrap_or(10_000)
    }

    /// Built-in weight for a drift kind. Not load-bearing constants:
    /// any of them can be replaced through `confidence_weights`.
    pub fn default_weight(kind: DriftKind) -> f64 {
        match kind {
            DriftKind::MissingImplementation => 0.90,
            DriftKind::SignatureMismatch => 0.85,
            DriftKind::BehaviorDeviation => 0.60,
            DriftKind::DocumentationStale => 0.50,
            DriftKind::DependencyDrift => 0.80,
            DriftKind::ApiBreakingChange => 0.95,
        }
    }

    /// Configured weight for a kind, sanitized: NaN falls back to the
    /// built-in default, negatives clamp to 0, values above 1 clamp to 1.
    pub fn confidence_weight(&self, kind: DriftKind) -> f64 {
        let raw = self
            .confidence_weights
            .get(kind.as_str())
            .copied()
            .unwrap_or_else(|| Self::default_weight(kind));
        if raw.is_nan() {
            Self::default_weight(kind)
        } else {
            raw.clamp(0.0, 1.0)
        }
    }
}
