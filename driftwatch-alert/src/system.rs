//! The alert system: create → (suppress | deliver) → resolve.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use driftwatch_core::clock::now_secs;
use driftwatch_core::config::AlertConfig;
use driftwatch_core::errors::StorageError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::{Alert, AlertEvent, DriftReport};
use driftwatch_store::connection::writer::with_immediate_transaction;
use driftwatch_store::queries::alerts::{self, AlertFilter, AlertSummary, NewAlert};
use driftwatch_store::DatabaseManager;

use crate::channels::ChannelRegistry;
use crate::dispatch::fan_out;
use crate::fingerprint::fingerprint;
use crate::rate_limit::RateLimiter;
use crate::rules::AlertRules;

/// What happened to one alert event.
#[derive(Debug)]
pub enum Outcome {
    /// A new alert row, or an existing unresolved alert re-delivered
    /// after its suppression window expired (`occurrence_count > 1`).
    /// The caller should dispatch it.
    Created(Alert),
    /// An unresolved alert with the same fingerprint exists inside the
    /// suppression window; its counter moved, nothing is delivered.
    Suppressed {
        alert_id: i64,
        occurrence_count: u32,
    },
    /// The per-kind rate limit rejected the event before persistence.
    RateLimited,
}

/// Counters from processing one drift report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub created: u32,
    pub suppressed: u32,
    pub rate_limited: u32,
}

pub struct AlertSystem {
    db: Arc<DatabaseManager>,
    rules: AlertRules,
    registry: ChannelRegistry,
    limiter: Mutex<RateLimiter>,
    channel_timeout: Duration,
}

impl AlertSystem {
    pub fn new(db: Arc<DatabaseManager>, config: &AlertConfig) -> Self {
        Self::with_registry(db, config, ChannelRegistry::from_config(config))
    }

    /// Build with an explicit registry (custom channel implementations).
    pub fn with_registry(
        db: Arc<DatabaseManager>,
        config: &AlertConfig,
        registry: ChannelRegistry,
    ) -> Self {
        Self {
            db,
            rules: AlertRules::from_config(config),
            registry,
            limiter: Mutex::new(RateLimiter::new(
                config.effective_rate_per_minute(),
                config.effective_rate_per_hour(),
            )),
            channel_timeout: Duration::from_millis(config.effective_channel_timeout_ms()),
        }
    }

    /// Register an additional channel handler.
    pub fn register_channel(&mut self, handler: Arc<dyn ChannelHandler>) {
        self.registry.register(handler);
    }

    /// Create (or fold into an existing) alert for an event.
    ///
    /// The fingerprint lookup and the insert/update run inside one
    /// immediate transaction on the write connection, keeping the
    /// check-and-insert atomic under concurrent creators.
    pub fn create(&self, event: &AlertEvent) -> Result<Outcome, StorageError> {
        {
            let mut limiter = self.limiter.lock().map_err(|_| StorageError::Sqlite {
                message: "rate limiter lock poisoned".to_string(),
            })?;
            if !limiter.allow(event.kind.as_str()) {
                debug!(kind = event.kind.as_str(), title = %event.title,
                    "alert rate limit hit");
                return Ok(Outcome::RateLimited);
            }
        }

        let fp = fingerprint(event.kind, &event.file, &event.spec_ref, event.drift_kind);
        let window = self.rules.window_for(event.kind, event.severity) as i64;
        let now = now_secs();

        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                match alerts::find_unresolved_by_fingerprint(tx, &fp)? {
                    Some((mut alert, last_delivered)) => {
                        if now.saturating_sub(last_delivered) < window {
                            let occurrence_count =
                                alerts::record_occurrence(tx, alert.id, now, false)?;
                            Ok(Outcome::Suppressed {
                                alert_id: alert.id,
                                occurrence_count,
                            })
                        } else {
                            // Window expired: same alert id, fresh delivery.
                            alert.occurrence_count =
                                alerts::record_occurrence(tx, alert.id, now, true)?;
                            Ok(Outcome::Created(alert))
                        }
                    }
                    None => {
                        let id = alerts::insert(
                            tx,
                            &NewAlert {
                                kind: event.kind,
                                severity: event.severity,
                                title: event.title.clone(),
                                message: event.message.clone(),
                                context: event.context.clone(),
                                fingerprint: fp.clone(),
                                created_at: now,
                            },
                        )?;
                        alerts::get(tx, id)?
                            .ok_or(StorageError::NotFound { id })
                            .map(Outcome::Created)
                    }
                }
            })
        })
    }

    /// Fan the alert out to every subscribed channel and persist the
    /// delivery log. Unknown channel names are logged and skipped.
    pub fn dispatch(&self, alert: &mut Alert) -> Result<(), StorageError> {
        let channel_names = self.rules.channels_for(alert.kind, alert.severity);
        let handlers: Vec<_> = channel_names
            .into_iter()
            .filter_map(|name| match self.registry.get(&name) {
                Some(handler) => Some((name, handler)),
                None => {
                    warn!(channel = %name, "rule references an unregistered channel");
                    None
                }
            })
            .collect();

        if handlers.is_empty() {
            return Ok(());
        }

        let records = fan_out(handlers, alert, self.channel_timeout);
        alert.delivery_log.extend(records);

        let id = alert.id;
        let log = alert.delivery_log.clone();
        self.db
            .with_writer(|conn| alerts::set_delivery_log(conn, id, &log))
    }

    /// Create-and-dispatch every event a report produces.
    pub fn process_report(&self, report: &DriftReport) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();
        for event in AlertEvent::from_report(report) {
            match self.create(&event) {
                Ok(Outcome::Created(mut alert)) => {
                    outcome.created += 1;
                    if let Err(e) = self.dispatch(&mut alert) {
                        warn!(alert_id = alert.id, error = %e,
                            "failed to persist delivery log");
                    }
                }
                Ok(Outcome::Suppressed { .. }) => outcome.suppressed += 1,
                Ok(Outcome::RateLimited) => outcome.rate_limited += 1,
                Err(e) => {
                    warn!(file = %report.file.display(), error = %e,
                        "alert creation failed");
                }
            }
        }
        outcome
    }

    /// Raise (or fold) a scan-failure alert for one file.
    pub fn report_scan_failure(&self, path: &Path, error: &str) {
        let event = AlertEvent::scan_failure(path, error);
        match self.create(&event) {
            Ok(Outcome::Created(mut alert)) => {
                if let Err(e) = self.dispatch(&mut alert) {
                    warn!(alert_id = alert.id, error = %e,
                        "failed to persist delivery log");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(file = %path.display(), error = %e,
                "scan-failure alert creation failed"),
        }
    }

    /// Mark an alert resolved. Idempotent: resolving a resolved alert
    /// is a no-op, not an error.
    pub fn resolve(&self, alert_id: i64, note: Option<&str>) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            match alerts::get(conn, alert_id)? {
                None => Err(StorageError::NotFound { id: alert_id }),
                Some(alert) if alert.resolved => Ok(()),
                Some(_) => {
                    alerts::mark_resolved(conn, alert_id, note)?;
                    Ok(())
                }
            }
        })
    }

    /// Read-only listing over the store.
    pub fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
        self.db.with_reader(|conn| alerts::list(conn, filter))
    }

    /// Fetch one alert.
    pub fn get(&self, alert_id: i64) -> Result<Option<Alert>, StorageError> {
        self.db.with_reader(|conn| alerts::get(conn, alert_id))
    }

    /// Aggregate counts; the recent-activity window is the last 24h.
    pub fn summary(&self) -> Result<AlertSummary, StorageError> {
        let since = now_secs() - 86_400;
        self.db.with_reader(|conn| alerts::summary(conn, since))
    }
}
