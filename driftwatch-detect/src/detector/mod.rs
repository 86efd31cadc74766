//! The drift detector.

pub mod classify;

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use driftwatch_core::config::DetectorConfig;
use driftwatch_core::types::{
    BaselineSnapshot, DriftItem, DriftKind, DriftReport, DriftSeverity, ExpectedElement,
    FileSignatures, PathBaseline, Specification,
};

use self::classify::{is_incompatible, signatures_match};

/// Classifies deviation between a file's current signatures and its
/// specification.
///
/// The detector is constructed per scan with an immutable baseline
/// snapshot; [`check`](DriftDetector::check) is pure with respect to
/// its inputs and the snapshot, so identical calls produce equal
/// reports.
pub struct DriftDetector {
    config: DetectorConfig,
    enabled: FxHashSet<DriftKind>,
    baselines: Arc<BaselineSnapshot>,
}

impl DriftDetector {
    pub fn new(
        config: DetectorConfig,
        enabled_checks: &[DriftKind],
        baselines: Arc<BaselineSnapshot>,
    ) -> Self {
        Self {
            config,
            enabled: enabled_checks.iter().copied().collect(),
            baselines,
        }
    }

    /// Detector with every check enabled and no baseline history.
    pub fn with_defaults(config: DetectorConfig) -> Self {
        Self::new(config, &DriftKind::ALL, Arc::new(BaselineSnapshot::default()))
    }

    /// Compare one file against its specification.
    ///
    /// `None` spec yields an empty info-tagged report, not an error:
    /// an unspecified path is unremarkable, not broken.
    pub fn check(
        &self,
        file: &Path,
        current: &FileSignatures,
        spec: Option<&Specification>,
    ) -> DriftReport {
        let Some(spec) = spec else {
            return DriftReport::without_spec(file);
        };

        let mut report = DriftReport::new(file, spec.source_ref.clone());
        let baseline = self.baselines.get(file);
        let mut code_changed = false;

        for element in &spec.elements {
            match current.get(&element.id) {
                None => {
                    code_changed = true;
                    self.classify_absent(&mut report, element, baseline);
                }
                Some(observed) => {
                    if !signatures_match(&element.signature, &observed.signature) {
                        code_changed = true;
                        self.classify_mismatch(
                            &mut report,
                            element,
                            &observed.signature,
                            baseline,
                        );
                    } else if let Some(prev) =
                        baseline.and_then(|b| b.behavior_hashes.get(&element.id))
                    {
                        if *prev != observed.behavior_hash {
                            code_changed = true;
                            self.push(
                                &mut report,
                                DriftKind::BehaviorDeviation,
                                DriftSeverity::Medium,
                                &element.id,
                                format!(
                                    "behavior of '{}' changed while its signature stayed stable",
                                    element.id
                                ),
                                Some(format!("behavior hash {prev:#x}")),
                                Some(format!("behavior hash {:#x}", observed.behavior_hash)),
                            );
                        }
                    }
                }
            }
        }

        for dep in &spec.dependencies {
            if let Some(observed) = current.dependencies.get(&dep.name) {
                if observed != &dep.version {
                    self.push(
                        &mut report,
                        DriftKind::DependencyDrift,
                        DriftSeverity::Medium,
                        &dep.name,
                        format!(
                            "dependency '{}' is at {} but the spec declares {}",
                            dep.name, observed, dep.version
                        ),
                        Some(dep.version.clone()),
                        Some(observed.clone()),
                    );
                }
            }
        }

        // A newer spec document with no code movement means the code
        // was not brought up to the revised expectations.
        if !code_changed {
            if let Some(b) = baseline {
                if let (Some(prev_doc), Some(prev_rev)) = (b.doc_hash, b.revision) {
                    if spec.revision > prev_rev && spec.doc_hash != prev_doc {
                        self.push(
                            &mut report,
                            DriftKind::DocumentationStale,
                            DriftSeverity::Low,
                            &spec.name,
                            format!(
                                "specification '{}' moved to revision {} with no code change",
                                spec.name, spec.revision
                            ),
                            Some(format!("revision {prev_rev}")),
                            Some(format!("revision {}", spec.revision)),
                        );
                    }
                }
            }
        }

        report
    }

    fn classify_absent(
        &self,
        report: &mut DriftReport,
        element: &ExpectedElement,
        baseline: Option<&PathBaseline>,
    ) {
        let was_stable =
            baseline.is_some_and(|b| b.stable_api.contains_key(&element.id));
        if was_stable && (element.is_public || element.is_breaking_if_removed) {
            self.push(
                report,
                DriftKind::ApiBreakingChange,
                DriftSeverity::Critical,
                &element.id,
                format!("previously stable public element '{}' was removed", element.id),
                Some(element.signature.clone()),
                None,
            );
        } else {
            self.push(
                report,
                DriftKind::MissingImplementation,
                DriftSeverity::High,
                &element.id,
                format!("'{}' is specified but not implemented", element.id),
                Some(element.signature.clone()),
                None,
            );
        }
    }

    fn classify_mismatch(
        &self,
        report: &mut DriftReport,
        element: &ExpectedElement,
        observed: &str,
        baseline: Option<&PathBaseline>,
    ) {
        let stable = baseline.and_then(|b| b.stable_api.get(&element.id));
        let breaking = element.is_public
            && stable.is_some_and(|s| is_incompatible(s, observed));

        if breaking {
            self.push(
                report,
                DriftKind::ApiBreakingChange,
                DriftSeverity::Critical,
                &element.id,
                format!(
                    "public element '{}' changed incompatibly from its stable signature",
                    element.id
                ),
                stable.cloned(),
                Some(observed.to_string()),
            );
        } else {
            let severity = if element.is_public || element.is_breaking_if_removed {
                DriftSeverity::High
            } else {
                DriftSeverity::Medium
            };
            self.push(
                report,
                DriftKind::SignatureMismatch,
                severity,
                &element.id,
                format!("signature of '{}' does not match the specification", element.id),
                Some(element.signature.clone()),
                Some(observed.to_string()),
            );
        }
    }

    /// Append an item unless its kind is disabled or its confidence
    /// falls below the configured floor.
    #[allow(clippy::too_many_arguments)]
    fn push(
        &self,
        report: &mut DriftReport,
        kind: DriftKind,
        severity: DriftSeverity,
        element_id: &str,
        description: String,
        expected: Option<String>,
        actual: Option<String>,
    ) {
        if !self.enabled.contains(&kind) {
            return;
        }
        let confidence = self.config.confidence_weight(kind);
        if confidence < self.config.effective_min_confidence() {
            return;
        }
        report.items.push(DriftItem {
            kind,
            severity,
            element_id: element_id.to_string(),
            description,
            confidence,
            expected,
            actual,
            line: None,
        });
    }
}
