//! Drift detector classification tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use driftwatch_core::config::DetectorConfig;
use driftwatch_core::types::{
    BaselineSnapshot, DeclaredDependency, DriftKind, DriftSeverity, ExpectedElement,
    FileSignatures, ObservedSignature, PathBaseline, Specification,
};
use driftwatch_detect::DriftDetector;

const FILE: &str = "src/calc.rs";

fn spec_with(elements: Vec<ExpectedElement>) -> Specification {
    Specification {
        name: "calc".to_string(),
        source_ref: "specs/calc.yaml".to_string(),
        revision: 1,
        doc_hash: 0xfeed,
        elements,
        dependencies: Vec::new(),
    }
}

fn element(id: &str, signature: &str) -> ExpectedElement {
    ExpectedElement {
        id: id.to_string(),
        signature: signature.to_string(),
        behavior: String::new(),
        behavior_hash: None,
        is_public: false,
        is_breaking_if_removed: false,
    }
}

fn public_element(id: &str, signature: &str) -> ExpectedElement {
    ExpectedElement {
        is_public: true,
        ..element(id, signature)
    }
}

fn signatures(items: &[(&str, &str, u64)]) -> FileSignatures {
    let mut map = FxHashMap::default();
    for (id, sig, hash) in items {
        map.insert(
            id.to_string(),
            ObservedSignature {
                signature: sig.to_string(),
                behavior_hash: *hash,
            },
        );
    }
    FileSignatures {
        items: map,
        dependencies: FxHashMap::default(),
    }
}

fn snapshot_for(file: &str, baseline: PathBaseline) -> Arc<BaselineSnapshot> {
    let mut map = FxHashMap::default();
    map.insert(PathBuf::from(file), baseline);
    Arc::new(BaselineSnapshot::new(map))
}

fn detector() -> DriftDetector {
    DriftDetector::with_defaults(DetectorConfig::default())
}

#[test]
fn signature_arity_mismatch_is_high_for_public_element() {
    // Spec declares calc(a, b); the implementation only takes calc(a).
    let spec = spec_with(vec![public_element("calc", "calc(a, b)")]);
    let current = signatures(&[("calc", "calc(a)", 1)]);

    let report = detector().check(Path::new(FILE), &current, Some(&spec));

    assert_eq!(report.items.len(), 1);
    let item = &report.items[0];
    assert_eq!(item.kind, DriftKind::SignatureMismatch);
    assert_eq!(item.severity, DriftSeverity::High);
    assert_eq!(item.element_id, "calc");
    assert_eq!(item.expected.as_deref(), Some("calc(a, b)"));
    assert_eq!(item.actual.as_deref(), Some("calc(a)"));
}

#[test]
fn private_mismatch_is_medium() {
    let spec = spec_with(vec![element("helper", "helper(x, y)")]);
    let current = signatures(&[("helper", "helper(x)", 1)]);

    let report = detector().check(Path::new(FILE), &current, Some(&spec));
    assert_eq!(report.items[0].severity, DriftSeverity::Medium);
}

#[test]
fn absent_element_is_missing_implementation() {
    let spec = spec_with(vec![element("calc", "calc(a, b)")]);
    let report = detector().check(Path::new(FILE), &FileSignatures::default(), Some(&spec));

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].kind, DriftKind::MissingImplementation);
    assert_eq!(report.items[0].severity, DriftSeverity::High);
}

#[test]
fn removing_stable_public_element_is_breaking() {
    let spec = spec_with(vec![public_element("calc", "calc(a, b)")]);
    let mut baseline = PathBaseline::default();
    baseline
        .stable_api
        .insert("calc".to_string(), "calc(a, b)".to_string());

    let det = DriftDetector::new(
        DetectorConfig::default(),
        &DriftKind::ALL,
        snapshot_for(FILE, baseline),
    );
    let report = det.check(Path::new(FILE), &FileSignatures::default(), Some(&spec));

    assert_eq!(report.items[0].kind, DriftKind::ApiBreakingChange);
    assert_eq!(report.items[0].severity, DriftSeverity::Critical);
}

#[test]
fn incompatible_change_to_stable_public_signature_is_breaking() {
    let spec = spec_with(vec![public_element("calc", "calc(a, b)")]);
    let mut baseline = PathBaseline::default();
    baseline
        .stable_api
        .insert("calc".to_string(), "calc(a, b)".to_string());

    let det = DriftDetector::new(
        DetectorConfig::default(),
        &DriftKind::ALL,
        snapshot_for(FILE, baseline),
    );
    // Arity dropped from 2 to 1 against the stable baseline.
    let current = signatures(&[("calc", "calc(a)", 1)]);
    let report = det.check(Path::new(FILE), &current, Some(&spec));

    assert_eq!(report.items[0].kind, DriftKind::ApiBreakingChange);
}

#[test]
fn behavior_hash_change_with_stable_signature_is_deviation() {
    let spec = spec_with(vec![element("calc", "calc(a, b)")]);
    let mut baseline = PathBaseline::default();
    baseline.behavior_hashes.insert("calc".to_string(), 0xaaa);

    let det = DriftDetector::new(
        DetectorConfig::default(),
        &DriftKind::ALL,
        snapshot_for(FILE, baseline),
    );
    let current = signatures(&[("calc", "calc(a, b)", 0xbbb)]);
    let report = det.check(Path::new(FILE), &current, Some(&spec));

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].kind, DriftKind::BehaviorDeviation);
    assert_eq!(report.items[0].severity, DriftSeverity::Medium);
}

#[test]
fn dependency_version_mismatch_is_reported() {
    let mut spec = spec_with(vec![element("calc", "calc(a, b)")]);
    spec.dependencies.push(DeclaredDependency {
        name: "serde".to_string(),
        version: "1.0".to_string(),
    });

    let mut current = signatures(&[("calc", "calc(a, b)", 1)]);
    current
        .dependencies
        .insert("serde".to_string(), "0.9".to_string());

    let report = detector().check(Path::new(FILE), &current, Some(&spec));
    let dep = report
        .items
        .iter()
        .find(|i| i.kind == DriftKind::DependencyDrift)
        .unwrap();
    assert_eq!(dep.element_id, "serde");
    assert_eq!(dep.severity, DriftSeverity::Medium);
}

#[test]
fn newer_spec_revision_without_code_change_is_stale_docs() {
    let mut spec = spec_with(vec![element("calc", "calc(a, b)")]);
    spec.revision = 3;
    spec.doc_hash = 0xbeef;

    let mut baseline = PathBaseline::default();
    baseline.doc_hash = Some(0xfeed);
    baseline.revision = Some(1);

    let det = DriftDetector::new(
        DetectorConfig::default(),
        &DriftKind::ALL,
        snapshot_for(FILE, baseline),
    );
    let current = signatures(&[("calc", "calc(a, b)", 1)]);
    let report = det.check(Path::new(FILE), &current, Some(&spec));

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].kind, DriftKind::DocumentationStale);
    assert_eq!(report.items[0].severity, DriftSeverity::Low);
}

#[test]
fn no_spec_yields_info_tagged_empty_report() {
    let report = detector().check(Path::new(FILE), &FileSignatures::default(), None);
    assert!(report.is_empty());
    assert!(report.note.is_some());
}

#[test]
fn min_confidence_drops_low_weight_items() {
    let mut config = DetectorConfig::default();
    config.min_confidence = Some(0.99);

    let spec = spec_with(vec![element("calc", "calc(a, b)")]);
    let det = DriftDetector::with_defaults(config);
    let report = det.check(Path::new(FILE), &FileSignatures::default(), Some(&spec));

    // MissingImplementation's default weight is below 0.99.
    assert!(report.is_empty());
}

#[test]
fn disabled_checks_are_not_reported() {
    let spec = spec_with(vec![element("calc", "calc(a, b)")]);
    let det = DriftDetector::new(
        DetectorConfig::default(),
        &[DriftKind::DependencyDrift],
        Arc::new(BaselineSnapshot::default()),
    );
    let report = det.check(Path::new(FILE), &FileSignatures::default(), Some(&spec));
    assert!(report.is_empty());
}

#[test]
fn report_order_follows_spec_element_order() {
    let spec = spec_with(vec![
        element("alpha", "alpha(a)"),
        element("beta", "beta(b)"),
        element("gamma", "gamma(c)"),
    ]);
    let report = detector().check(Path::new(FILE), &FileSignatures::default(), Some(&spec));
    let ids: Vec<_> = report.items.iter().map(|i| i.element_id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn check_is_idempotent_for_identical_inputs() {
    let spec = spec_with(vec![
        public_element("calc", "calc(a, b)"),
        element("helper", "helper(x)"),
    ]);
    let current = signatures(&[("calc", "calc(a)", 7)]);

    let det = detector();
    let first = det.check(Path::new(FILE), &current, Some(&spec));
    let second = det.check(Path::new(FILE), &current, Some(&spec));
    assert_eq!(first, second);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,8}"
    }

    prop_compose! {
        fn arb_element()(id in identifier(), params in 0usize..4, public in any::<bool>())
            -> ExpectedElement
        {
            let args: Vec<String> = (0..params).map(|i| format!("p{i}")).collect();
            ExpectedElement {
                id: id.clone(),
                signature: format!("{id}({})", args.join(", ")),
                behavior: String::new(),
                behavior_hash: None,
                is_public: public,
                is_breaking_if_removed: false,
            }
        }
    }

    proptest! {
        /// Two identical check calls always produce equal reports.
        #[test]
        fn check_idempotence(
            elements in proptest::collection::vec(arb_element(), 0..8),
            observed in proptest::collection::vec((identifier(), 0usize..4, any::<u64>()), 0..8),
        ) {
            let spec = spec_with(elements);
            let mut map = FxHashMap::default();
            for (id, params, hash) in observed {
                let args: Vec<String> = (0..params).map(|i| format!("a{i}")).collect();
                map.insert(id.clone(), ObservedSignature {
                    signature: format!("{id}({})", args.join(", ")),
                    behavior_hash: hash,
                });
            }
            let current = FileSignatures { items: map, dependencies: FxHashMap::default() };

            let det = detector();
            let first = det.check(Path::new(FILE), &current, Some(&spec));
            let second = det.check(Path::new(FILE), &current, Some(&spec));
            prop_assert_eq!(first, second);
        }
    }
}
