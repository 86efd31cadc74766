//! Alert system behavior: suppression, routing, isolated dispatch.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use driftwatch_core::config::{AlertConfig, AlertRuleConfig};
use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::{Alert, AlertEvent, AlertKind, AlertSeverity, DriftKind};
use driftwatch_alert::{AlertSystem, ChannelRegistry, Outcome};
use driftwatch_store::queries::alerts::AlertFilter;
use driftwatch_store::DatabaseManager;

/// Channel that records every alert id it delivers.
struct RecordingChannel {
    name: &'static str,
    delivered: Arc<Mutex<Vec<i64>>>,
}

impl RecordingChannel {
    fn new(name: &'static str) -> (Arc<Self>, Arc<Mutex<Vec<i64>>>) {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                name,
                delivered: delivered.clone(),
            }),
            delivered,
        )
    }
}

impl ChannelHandler for RecordingChannel {
    fn name(&self) -> &str {
        self.name
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        self.delivered.lock().unwrap().push(alert.id);
        Ok(())
    }
}

/// Channel that always fails.
struct FailingChannel(&'static str);

impl ChannelHandler for FailingChannel {
    fn name(&self) -> &str {
        self.0
    }

    fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
        Err(ChannelError::SendFailed {
            channel: self.0.to_string(),
            message: "smtp gateway refused".to_string(),
        })
    }
}

/// Channel that panics mid-delivery.
struct PanickingChannel;

impl ChannelHandler for PanickingChannel {
    fn name(&self) -> &str {
        "panicky"
    }

    fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
        panic!("handler bug");
    }
}

/// Channel that sleeps past any reasonable timeout.
struct SlowChannel;

impl ChannelHandler for SlowChannel {
    fn name(&self) -> &str {
        "slow"
    }

    fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
        std::thread::sleep(Duration::from_millis(400));
        Ok(())
    }
}

fn event(severity: AlertSeverity, file: &str) -> AlertEvent {
    AlertEvent {
        kind: AlertKind::Drift,
        severity,
        title: format!("Signature mismatch in {file}"),
        message: "calc drifted".to_string(),
        file: file.to_string(),
        spec_ref: "specs/calc.yaml".to_string(),
        drift_kind: Some(DriftKind::SignatureMismatch),
        context: BTreeMap::new(),
    }
}

fn config_routing_to(channels: &[&str], window_secs: u64) -> AlertConfig {
    AlertConfig {
        suppression_window_secs: Some(window_secs),
        channel_timeout_ms: Some(100),
        rules: vec![AlertRuleConfig {
            min_severity: AlertSeverity::Info,
            kind: None,
            channels: channels.iter().map(|s| s.to_string()).collect(),
            suppression_window_secs: None,
        }],
        ..Default::default()
    }
}

fn system_with(
    config: AlertConfig,
    handlers: Vec<Arc<dyn ChannelHandler>>,
) -> AlertSystem {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    let mut registry = ChannelRegistry::new();
    for handler in handlers {
        registry.register(handler);
    }
    AlertSystem::with_registry(db, &config, registry)
}

#[test]
fn repeated_fingerprint_within_window_is_suppressed() {
    // Scenario: two identical drift events with a 60-second window.
    let (channel, delivered) = RecordingChannel::new("rec");
    let system = system_with(config_routing_to(&["rec"], 60), vec![channel]);

    let ev = event(AlertSeverity::Error, "src/calc.rs");

    let first = system.create(&ev).unwrap();
    let Outcome::Created(mut alert) = first else {
        panic!("first occurrence must create");
    };
    system.dispatch(&mut alert).unwrap();

    let second = system.create(&ev).unwrap();
    let Outcome::Suppressed {
        alert_id,
        occurrence_count,
    } = second
    else {
        panic!("second occurrence must suppress");
    };

    assert_eq!(alert_id, alert.id);
    assert_eq!(occurrence_count, 2);
    // Exactly one delivery happened.
    assert_eq!(delivered.lock().unwrap().len(), 1);
    // Exactly one alert row exists, carrying both occurrences.
    let listed = system.list(&AlertFilter::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].occurrence_count, 2);
}

#[test]
fn expired_window_redelivers_the_same_alert() {
    let (channel, delivered) = RecordingChannel::new("rec");
    // Zero-second window: every occurrence is outside it.
    let system = system_with(config_routing_to(&["rec"], 0), vec![channel]);

    let ev = event(AlertSeverity::Error, "src/calc.rs");

    let Outcome::Created(mut first) = system.create(&ev).unwrap() else {
        panic!("expected creation");
    };
    system.dispatch(&mut first).unwrap();

    let Outcome::Created(mut again) = system.create(&ev).unwrap() else {
        panic!("expected re-delivery, not suppression");
    };
    system.dispatch(&mut again).unwrap();

    // Same alert id, incremented count, two deliveries, one row.
    assert_eq!(again.id, first.id);
    assert_eq!(again.occurrence_count, 2);
    assert_eq!(delivered.lock().unwrap().len(), 2);
    assert_eq!(system.list(&AlertFilter::default()).unwrap().len(), 1);
}

#[test]
fn below_threshold_severity_skips_the_channel() {
    // Scenario: webhook subscribed at Warning and above; an Info alert
    // is created but never dispatched to it.
    let (webhook, delivered) = RecordingChannel::new("webhook");
    let config = AlertConfig {
        rules: vec![AlertRuleConfig {
            min_severity: AlertSeverity::Warning,
            kind: None,
            channels: vec!["webhook".to_string()],
            suppression_window_secs: None,
        }],
        ..Default::default()
    };
    let system = system_with(config, vec![webhook]);

    let Outcome::Created(mut alert) =
        system.create(&event(AlertSeverity::Info, "src/calc.rs")).unwrap()
    else {
        panic!("creation is independent of routing");
    };
    system.dispatch(&mut alert).unwrap();

    assert!(delivered.lock().unwrap().is_empty());
    assert!(alert.delivery_log.is_empty());
}

#[test]
fn failing_channel_does_not_affect_siblings() {
    // Scenario: email always fails, log succeeds for the same alert.
    let (log, _) = RecordingChannel::new("log");
    let system = system_with(
        config_routing_to(&["email", "log"], 60),
        vec![Arc::new(FailingChannel("email")), log],
    );

    let Outcome::Created(mut alert) =
        system.create(&event(AlertSeverity::Error, "src/calc.rs")).unwrap()
    else {
        panic!("expected creation");
    };
    system.dispatch(&mut alert).unwrap();

    let email = alert
        .delivery_log
        .iter()
        .find(|r| r.channel == "email")
        .unwrap();
    let log = alert
        .delivery_log
        .iter()
        .find(|r| r.channel == "log")
        .unwrap();
    assert!(!email.success);
    assert!(email.detail.as_deref().unwrap().contains("smtp gateway refused"));
    assert!(log.success);

    // The delivery log is persisted, not just in-memory.
    let stored = system.get(alert.id).unwrap().unwrap();
    assert_eq!(stored.delivery_log, alert.delivery_log);
}

#[test]
fn panicking_channel_is_recorded_and_isolated() {
    let (ok, _) = RecordingChannel::new("ok");
    let system = system_with(
        config_routing_to(&["panicky", "ok"], 60),
        vec![Arc::new(PanickingChannel), ok],
    );

    let Outcome::Created(mut alert) =
        system.create(&event(AlertSeverity::Error, "src/calc.rs")).unwrap()
    else {
        panic!("expected creation");
    };
    system.dispatch(&mut alert).unwrap();

    let panicky = alert
        .delivery_log
        .iter()
        .find(|r| r.channel == "panicky")
        .unwrap();
    assert!(!panicky.success);
    let ok = alert.delivery_log.iter().find(|r| r.channel == "ok").unwrap();
    assert!(ok.success);
}

#[test]
fn slow_channel_times_out_without_blocking_siblings() {
    let (fast, _) = RecordingChannel::new("fast");
    let system = system_with(
        config_routing_to(&["slow", "fast"], 60),
        vec![Arc::new(SlowChannel), fast],
    );

    let Outcome::Created(mut alert) =
        system.create(&event(AlertSeverity::Error, "src/calc.rs")).unwrap()
    else {
        panic!("expected creation");
    };
    system.dispatch(&mut alert).unwrap();

    let slow = alert.delivery_log.iter().find(|r| r.channel == "slow").unwrap();
    assert!(!slow.success);
    assert!(slow.detail.as_deref().unwrap().contains("timed out"));
    let fast = alert.delivery_log.iter().find(|r| r.channel == "fast").unwrap();
    assert!(fast.success);
}

#[test]
fn rate_limit_rejects_before_persistence() {
    let (rec, _) = RecordingChannel::new("rec");
    let mut config = config_routing_to(&["rec"], 60);
    config.rate_per_minute = Some(1);
    let system = system_with(config, vec![rec]);

    // Two distinct fingerprints, same kind: the limiter keys on kind.
    let first = system.create(&event(AlertSeverity::Error, "src/a.rs")).unwrap();
    assert!(matches!(first, Outcome::Created(_)));
    let second = system.create(&event(AlertSeverity::Error, "src/b.rs")).unwrap();
    assert!(matches!(second, Outcome::RateLimited));

    // The limited event never reached the store.
    assert_eq!(system.list(&AlertFilter::default()).unwrap().len(), 1);
}

#[test]
fn resolve_is_idempotent_and_reopens_the_fingerprint() {
    let (rec, _) = RecordingChannel::new("rec");
    let system = system_with(config_routing_to(&["rec"], 3_600), vec![rec]);

    let ev = event(AlertSeverity::Error, "src/calc.rs");
    let Outcome::Created(alert) = system.create(&ev).unwrap() else {
        panic!("expected creation");
    };

    system.resolve(alert.id, Some("fixed in #42")).unwrap();
    // Second resolve is a no-op, not an error.
    system.resolve(alert.id, Some("again")).unwrap();
    let stored = system.get(alert.id).unwrap().unwrap();
    assert!(stored.resolved);
    assert_eq!(stored.resolution_note.as_deref(), Some("fixed in #42"));

    // A resolved alert no longer suppresses: the next occurrence is a
    // brand-new alert.
    let Outcome::Created(fresh) = system.create(&ev).unwrap() else {
        panic!("expected a new alert after resolution");
    };
    assert_ne!(fresh.id, alert.id);
    assert_eq!(fresh.occurrence_count, 1);

    // Unknown ids are an error.
    assert!(system.resolve(99_999, None).is_err());
}

#[test]
fn summary_reflects_created_alerts() {
    let (rec, _) = RecordingChannel::new("rec");
    let system = system_with(config_routing_to(&["rec"], 60), vec![rec]);

    system.create(&event(AlertSeverity::Error, "src/a.rs")).unwrap();
    system.create(&event(AlertSeverity::Info, "src/b.rs")).unwrap();

    let summary = system.summary().unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.unresolved, 2);
    assert_eq!(summary.created_since, 2);
}
