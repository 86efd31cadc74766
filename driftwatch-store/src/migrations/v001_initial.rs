//! V001: Initial schema — alerts, baselines, scan_runs.

pub const MIGRATION_SQL: &str = r#"
-- Alerts: deduplicated, persisted notifications.
-- The fingerprint index backs the suppression lookup; the
-- (resolved, severity) index backs operator queries.
CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    severity TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    context TEXT NOT NULL DEFAULT '{}',
    fingerprint TEXT NOT NULL,
    occurrence_count INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    last_delivered_at INTEGER NOT NULL,
    resolved INTEGER NOT NULL DEFAULT 0,
    resolution_note TEXT,
    delivery_log TEXT NOT NULL DEFAULT '[]'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_alerts_fingerprint
    ON alerts(fingerprint) WHERE resolved = 0;
CREATE INDEX IF NOT EXISTS idx_alerts_resolved_severity
    ON alerts(resolved, severity);
CREATE INDEX IF NOT EXISTS idx_alerts_created
    ON alerts(created_at DESC);

-- Element baselines: what the last accepted scan observed per path.
-- The detector's behavior-deviation and breaking-change checks compare
-- against these rows.
CREATE TABLE IF NOT EXISTS baselines (
    path TEXT NOT NULL,
    element_id TEXT NOT NULL,
    signature TEXT NOT NULL,
    behavior_hash INTEGER NOT NULL,
    is_public INTEGER NOT NULL DEFAULT 0,
    observed_at INTEGER NOT NULL,
    PRIMARY KEY (path, element_id)
) STRICT;

-- Spec document baselines, one row per path.
CREATE TABLE IF NOT EXISTS doc_baselines (
    path TEXT PRIMARY KEY,
    doc_hash INTEGER NOT NULL,
    revision INTEGER NOT NULL,
    observed_at INTEGER NOT NULL
) STRICT;

-- Scan runs: append-only log of scheduler cycles.
CREATE TABLE IF NOT EXISTS scan_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    files_checked INTEGER,
    reports_produced INTEGER,
    alerts_created INTEGER,
    alerts_suppressed INTEGER,
    scan_errors INTEGER,
    throttled INTEGER NOT NULL DEFAULT 0,
    duration_ms INTEGER,
    status TEXT NOT NULL DEFAULT 'running',
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_scan_runs_time
    ON scan_runs(started_at DESC);
"#;
