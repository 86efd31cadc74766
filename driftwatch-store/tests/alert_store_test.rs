//! Persistence tests for alerts, baselines, and scan runs.

use std::collections::BTreeMap;
use std::path::Path;

use driftwatch_core::types::{AlertKind, AlertSeverity, DeliveryRecord};
use driftwatch_store::queries::{alerts, baselines, scan_runs};
use driftwatch_store::DatabaseManager;

fn new_alert(fingerprint: &str, severity: AlertSeverity) -> alerts::NewAlert {
    alerts::NewAlert {
        kind: AlertKind::Drift,
        severity,
        title: "Signature mismatch in src/calc.rs".to_string(),
        message: "calc drifted".to_string(),
        context: BTreeMap::from([("file".to_string(), "src/calc.rs".to_string())]),
        fingerprint: fingerprint.to_string(),
        created_at: 1_000,
    }
}

#[test]
fn insert_then_find_by_fingerprint() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Error))?;

        let (found, last_delivered) =
            alerts::find_unresolved_by_fingerprint(conn, "fp-1")?.unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.severity, AlertSeverity::Error);
        assert_eq!(found.occurrence_count, 1);
        assert_eq!(found.created_at, 1_000);
        // A fresh alert anchors the suppression window at creation.
        assert_eq!(last_delivered, 1_000);

        assert!(alerts::find_unresolved_by_fingerprint(conn, "fp-2")?.is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn occurrences_increment_and_redelivery_reanchors() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Warning))?;

        // Suppressed occurrence: count moves, anchor does not.
        let count = alerts::record_occurrence(conn, id, 1_005, false)?;
        assert_eq!(count, 2);
        let (_, anchor) = alerts::find_unresolved_by_fingerprint(conn, "fp-1")?.unwrap();
        assert_eq!(anchor, 1_000);

        // Re-delivered occurrence after the window: anchor moves too.
        let count = alerts::record_occurrence(conn, id, 1_120, true)?;
        assert_eq!(count, 3);
        let (alert, anchor) = alerts::find_unresolved_by_fingerprint(conn, "fp-1")?.unwrap();
        assert_eq!(anchor, 1_120);
        // Identity is preserved: same alert row throughout.
        assert_eq!(alert.id, id);
        Ok(())
    })
    .unwrap();
}

#[test]
fn resolved_alerts_leave_the_fingerprint_index() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Error))?;
        assert!(alerts::mark_resolved(conn, id, Some("fixed"))?);

        // The fingerprint no longer suppresses: a new occurrence gets a new row.
        assert!(alerts::find_unresolved_by_fingerprint(conn, "fp-1")?.is_none());

        let resolved = alerts::get(conn, id)?.unwrap();
        assert!(resolved.resolved);
        assert_eq!(resolved.resolution_note.as_deref(), Some("fixed"));
        Ok(())
    })
    .unwrap();
}

#[test]
fn mark_resolved_is_idempotent_and_keeps_first_note() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Error))?;
        assert!(alerts::mark_resolved(conn, id, Some("first"))?);
        assert!(alerts::mark_resolved(conn, id, None)?);

        let alert = alerts::get(conn, id)?.unwrap();
        assert!(alert.resolved);
        assert_eq!(alert.resolution_note.as_deref(), Some("first"));

        // Unknown id reports no change.
        assert!(!alerts::mark_resolved(conn, 9_999, None)?);
        Ok(())
    })
    .unwrap();
}

#[test]
fn delivery_log_roundtrip() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Error))?;
        let log = vec![
            DeliveryRecord {
                channel: "log".to_string(),
                success: true,
                detail: None,
                at: 1_001,
            },
            DeliveryRecord {
                channel: "email".to_string(),
                success: false,
                detail: Some("gateway refused".to_string()),
                at: 1_001,
            },
        ];
        alerts::set_delivery_log(conn, id, &log)?;

        let alert = alerts::get(conn, id)?.unwrap();
        assert_eq!(alert.delivery_log, log);
        Ok(())
    })
    .unwrap();
}

#[test]
fn list_applies_filters_and_limit() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let a = alerts::insert(conn, &new_alert("fp-a", AlertSeverity::Info))?;
        let _b = alerts::insert(conn, &new_alert("fp-b", AlertSeverity::Error))?;
        let _c = alerts::insert(conn, &new_alert("fp-c", AlertSeverity::Critical))?;
        alerts::mark_resolved(conn, a, None)?;

        let unresolved = alerts::list(
            conn,
            &alerts::AlertFilter {
                resolved: Some(false),
                ..Default::default()
            },
        )?;
        assert_eq!(unresolved.len(), 2);

        let severe = alerts::list(
            conn,
            &alerts::AlertFilter {
                min_severity: Some(AlertSeverity::Error),
                ..Default::default()
            },
        )?;
        assert_eq!(severe.len(), 2);

        let one = alerts::list(
            conn,
            &alerts::AlertFilter {
                limit: Some(1),
                ..Default::default()
            },
        )?;
        assert_eq!(one.len(), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn summary_counts_by_severity_and_kind() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        alerts::insert(conn, &new_alert("fp-a", AlertSeverity::Error))?;
        alerts::insert(conn, &new_alert("fp-b", AlertSeverity::Error))?;
        let mut scan = new_alert("fp-c", AlertSeverity::Warning);
        scan.kind = AlertKind::Scan;
        scan.created_at = 2_000;
        alerts::insert(conn, &scan)?;

        let summary = alerts::summary(conn, 1_500)?;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unresolved, 3);
        assert_eq!(summary.created_since, 1);
        assert!(summary
            .by_severity
            .contains(&(AlertSeverity::Error, 2)));
        assert!(summary.by_kind.contains(&(AlertKind::Scan, 1)));
        Ok(())
    })
    .unwrap();
}

#[test]
fn baseline_roundtrip_preserves_stable_api_and_doc_state() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        baselines::upsert_elements(
            conn,
            "src/calc.rs",
            &[
                baselines::ObservedElement {
                    element_id: "calc".to_string(),
                    signature: "calc(a, b)".to_string(),
                    behavior_hash: 0xabc,
                    is_public: true,
                },
                baselines::ObservedElement {
                    element_id: "helper".to_string(),
                    signature: "helper(x)".to_string(),
                    behavior_hash: 0xdef,
                    is_public: false,
                },
            ],
            1_000,
        )?;
        baselines::upsert_doc(conn, "src/calc.rs", 0xfeed, 2, 1_000)?;

        let snapshot = baselines::load_snapshot(conn)?;
        let baseline = snapshot.get(Path::new("src/calc.rs")).unwrap();
        assert_eq!(baseline.behavior_hashes.get("calc"), Some(&0xabc));
        assert_eq!(baseline.behavior_hashes.get("helper"), Some(&0xdef));
        // Only public elements join the stable API set.
        assert_eq!(baseline.stable_api.get("calc").map(String::as_str), Some("calc(a, b)"));
        assert!(!baseline.stable_api.contains_key("helper"));
        assert_eq!(baseline.doc_hash, Some(0xfeed));
        assert_eq!(baseline.revision, Some(2));
        Ok(())
    })
    .unwrap();
}

#[test]
fn scan_runs_record_lifecycle() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        let id = scan_runs::insert_start(conn, 5_000)?;
        scan_runs::complete(
            conn,
            id,
            5_002,
            &scan_runs::ScanRunUpdate {
                files_checked: 4,
                reports_produced: 2,
                alerts_created: 1,
                alerts_suppressed: 1,
                scan_errors: 0,
                throttled: false,
                duration_ms: 2_000,
                status: "completed".to_string(),
                error: None,
            },
        )?;

        let runs = scan_runs::recent(conn, 10)?;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, "completed");
        assert_eq!(runs[0].files_checked, Some(4));
        assert_eq!(scan_runs::count(conn)?, 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn on_disk_store_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state").join("driftwatch.db");

    {
        let db = DatabaseManager::open(&path).unwrap();
        db.with_writer(|conn| {
            alerts::insert(conn, &new_alert("fp-1", AlertSeverity::Error))?;
            Ok(())
        })
        .unwrap();
        db.checkpoint().unwrap();
    }

    let db = DatabaseManager::open(&path).unwrap();
    let listed = db
        .with_reader(|conn| alerts::list(conn, &alerts::AlertFilter::default()))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].fingerprint, "fp-1");
}
