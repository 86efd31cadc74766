//! The realignment engine: drift report in, ranked suggestions out.

pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::bounded;
use tracing::debug;

use driftwatch_core::config::DetectorConfig;
use driftwatch_core::errors::SuggestError;
use driftwatch_core::traits::SuggestionEnricher;
use driftwatch_core::types::{
    Alert, AlertKind, AlertSeverity, DriftItem, DriftKind, DriftReport, DriftSeverity,
    Suggestion, SuggestionCategory,
};
use rustc_hash::FxHashSet;

/// Maps a drift report to actionable, ranked suggestions.
///
/// Rule-based templates provide a deterministic floor; the optional
/// enricher can only add to it. A non-empty report therefore always
/// yields at least one suggestion, whatever the enricher does.
pub struct RealignmentEngine {
    enricher_timeout: Duration,
}

impl RealignmentEngine {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            enricher_timeout: Duration::from_millis(config.effective_enricher_timeout_ms()),
        }
    }

    /// Produce suggestions ordered by descending priority, ties broken
    /// by ascending effort: cheapest high-priority fix first.
    pub fn suggest(
        &self,
        report: &DriftReport,
        enricher: Option<Arc<dyn SuggestionEnricher>>,
    ) -> Vec<Suggestion> {
        let mut suggestions: Vec<Suggestion> = report
            .items
            .iter()
            .map(|item| templates::suggestion_for(item, &report.file))
            .collect();

        if let Some(enricher) = enricher {
            match self.run_enricher(enricher, report) {
                Ok(extra) => merge(&mut suggestions, extra),
                Err(e) => {
                    debug!(error = %e, file = %report.file.display(),
                        "enricher unavailable, keeping rule-based suggestions");
                }
            }
        }

        rank(&mut suggestions);
        suggestions
    }

    /// Suggestions for a persisted alert, reconstructed from the
    /// context its drift report left behind. Scan-failure alerts get a
    /// single investigative suggestion; drift alerts go through the
    /// same template and enrichment path as a live report.
    pub fn suggest_for_alert(
        &self,
        alert: &Alert,
        enricher: Option<Arc<dyn SuggestionEnricher>>,
    ) -> Vec<Suggestion> {
        match report_from_alert(alert) {
            Some(report) => self.suggest(&report, enricher),
            None => vec![Suggestion {
                category: SuggestionCategory::Configuration,
                title: format!("Investigate: {}", alert.title),
                description: format!(
                    "The monitor could not scan this file ({}). Check that the path \
                     exists, is readable, and the extractor supports it.",
                    alert.message
                ),
                priority: 3,
                effort: 2,
                confidence: 0.5,
                file: alert.context.get("file").map(Into::into),
                line: None,
                snippet: None,
            }],
        }
    }

    /// Run the enricher on its own thread under the configured budget.
    /// A slow enricher is abandoned, not joined; it finishes into a
    /// dropped channel.
    fn run_enricher(
        &self,
        enricher: Arc<dyn SuggestionEnricher>,
        report: &DriftReport,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let (tx, rx) = bounded(1);
        let report = report.clone();
        std::thread::spawn(move || {
            let _ = tx.send(enricher.enrich(&report));
        });

        rx.recv_timeout(self.enricher_timeout)
            .map_err(|_| SuggestError::Timeout {
                timeout_ms: self.enricher_timeout.as_millis() as u64,
            })?
    }
}

/// Rebuild a minimal drift report from a persisted drift alert's
/// context. Returns None for alerts that never came from a report.
fn report_from_alert(alert: &Alert) -> Option<DriftReport> {
    if alert.kind != AlertKind::Drift {
        return None;
    }
    let kind = alert
        .context
        .get("drift_kind")
        .and_then(|k| DriftKind::parse(k))?;
    let file = alert.context.get("file")?;

    let severity = match alert.severity {
        AlertSeverity::Critical => DriftSeverity::Critical,
        AlertSeverity::Error => DriftSeverity::High,
        AlertSeverity::Warning => DriftSeverity::Medium,
        AlertSeverity::Info => DriftSeverity::Low,
    };
    let confidence = alert
        .context
        .get("max_confidence")
        .and_then(|c| c.parse::<f64>().ok())
        .unwrap_or(0.5);

    let mut report = DriftReport::new(
        file.clone(),
        alert.context.get("spec").cloned().unwrap_or_default(),
    );
    let elements = alert
        .context
        .get("elements")
        .map(|e| e.split(',').map(str::to_string).collect::<Vec<_>>())
        .unwrap_or_default();
    for element_id in elements.into_iter().filter(|e| !e.is_empty()) {
        report.items.push(DriftItem {
            kind,
            severity,
            element_id,
            description: alert.message.clone(),
            confidence,
            expected: None,
            actual: None,
            line: None,
        });
    }
    if report.items.is_empty() {
        return None;
    }
    Some(report)
}

fn dedupe_key(s: &Suggestion) -> (String, String, String) {
    (
        s.category.as_str().to_string(),
        s.file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        s.title.clone(),
    )
}

/// Fold enricher output into the rule-based list, deduplicated by
/// (category, file, title). Enricher confidence is kept on items that
/// survive; out-of-range rankings are clamped rather than rejected.
fn merge(base: &mut Vec<Suggestion>, extra: Vec<Suggestion>) {
    let mut seen: FxHashSet<(String, String, String)> =
        base.iter().map(dedupe_key).collect();

    for mut s in extra {
        if s.title.is_empty() {
            continue;
        }
        s.priority = s.priority.clamp(1, 5);
        s.effort = s.effort.clamp(1, 5);
        s.confidence = if s.confidence.is_nan() {
            0.0
        } else {
            s.confidence.clamp(0.0, 1.0)
        };
        if seen.insert(dedupe_key(&s)) {
            base.push(s);
        }
    }
}

fn rank(suggestions: &mut [Suggestion]) {
    // Stable sort: equal (priority, effort) keep insertion order,
    // which puts rule-based items ahead of enricher extras.
    suggestions.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.effort.cmp(&b.effort))
    });
}
