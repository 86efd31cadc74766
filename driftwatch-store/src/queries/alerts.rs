//! Queries for the alerts table.

use std::collections::BTreeMap;

use driftwatch_core::errors::StorageError;
use driftwatch_core::types::{Alert, AlertKind, AlertSeverity, DeliveryRecord};
use rusqlite::{params, Connection};

/// Insert payload for a brand-new alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    pub fingerprint: String,
    pub created_at: i64,
}

/// Raw row, decoded into a typed [`Alert`] after fetching.
struct RawAlert {
    id: i64,
    kind: String,
    severity: String,
    title: String,
    message: String,
    context: String,
    fingerprint: String,
    occurrence_count: i64,
    created_at: i64,
    last_delivered_at: i64,
    resolved: i64,
    resolution_note: Option<String>,
    delivery_log: String,
}

const SELECT_COLUMNS: &str = "id, kind, severity, title, message, context, fingerprint, \
     occurrence_count, created_at, last_delivered_at, resolved, resolution_note, delivery_log";

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAlert> {
    Ok(RawAlert {
        id: row.get(0)?,
        kind: row.get(1)?,
        severity: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        context: row.get(5)?,
        fingerprint: row.get(6)?,
        occurrence_count: row.get(7)?,
        created_at: row.get(8)?,
        last_delivered_at: row.get(9)?,
        resolved: row.get(10)?,
        resolution_note: row.get(11)?,
        delivery_log: row.get(12)?,
    })
}

fn decode(raw: RawAlert) -> Result<(Alert, i64), StorageError> {
    let kind = AlertKind::parse(&raw.kind).ok_or_else(|| StorageError::Corrupt {
        message: format!("unknown alert kind '{}'", raw.kind),
    })?;
    let severity =
        AlertSeverity::parse(&raw.severity).ok_or_else(|| StorageError::Corrupt {
            message: format!("unknown severity '{}'", raw.severity),
        })?;
    let context: BTreeMap<String, String> =
        serde_json::from_str(&raw.context).map_err(|e| StorageError::Corrupt {
            message: format!("alert context: {e}"),
        })?;
    let delivery_log: Vec<DeliveryRecord> =
        serde_json::from_str(&raw.delivery_log).map_err(|e| StorageError::Corrupt {
            message: format!("delivery log: {e}"),
        })?;

    Ok((
        Alert {
            id: raw.id,
            created_at: raw.created_at,
            kind,
            severity,
            title: raw.title,
            message: raw.message,
            context,
            fingerprint: raw.fingerprint,
            occurrence_count: raw.occurrence_count as u32,
            resolved: raw.resolved != 0,
            resolution_note: raw.resolution_note,
            delivery_log,
        },
        raw.last_delivered_at,
    ))
}

/// Insert a new alert. Returns the row id.
pub fn insert(conn: &Connection, alert: &NewAlert) -> Result<i64, StorageError> {
    let context = serde_json::to_string(&alert.context).map_err(|e| StorageError::Corrupt {
        message: format!("serialize context: {e}"),
    })?;
    conn.execute(
        "INSERT INTO alerts
            (kind, severity, title, message, context, fingerprint,
             occurrence_count, created_at, last_delivered_at, resolved, delivery_log)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7, 0, '[]')",
        params![
            alert.kind.as_str(),
            alert.severity.as_str(),
            alert.title,
            alert.message,
            context,
            alert.fingerprint,
            alert.created_at,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Look up the unresolved alert carrying a fingerprint, if any.
/// Returns the decoded alert and its last delivery time, the anchor
/// for the suppression window.
pub fn find_unresolved_by_fingerprint(
    conn: &Connection,
    fingerprint: &str,
) -> Result<Option<(Alert, i64)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM alerts
             WHERE fingerprint = ?1 AND resolved = 0
             ORDER BY created_at DESC LIMIT 1"
        ))
        .map_err(sqlite_err)?;

    let raw = stmt
        .query_map(params![fingerprint], read_raw)
        .map_err(sqlite_err)?
        .next()
        .transpose()
        .map_err(sqlite_err)?;

    raw.map(decode).transpose()
}

/// Record one more occurrence of an existing alert. When `delivered`,
/// the suppression window re-anchors at `now`. Returns the new count.
pub fn record_occurrence(
    conn: &Connection,
    id: i64,
    now: i64,
    delivered: bool,
) -> Result<u32, StorageError> {
    if delivered {
        conn.execute(
            "UPDATE alerts SET occurrence_count = occurrence_count + 1,
                               last_delivered_at = ?2
             WHERE id = ?1",
            params![id, now],
        )
    } else {
        conn.execute(
            "UPDATE alerts SET occurrence_count = occurrence_count + 1 WHERE id = ?1",
            params![id],
        )
    }
    .map_err(sqlite_err)?;

    conn.query_row(
        "SELECT occurrence_count FROM alerts WHERE id = ?1",
        params![id],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u32)
    .map_err(sqlite_err)
}

/// Replace an alert's delivery log.
pub fn set_delivery_log(
    conn: &Connection,
    id: i64,
    log: &[DeliveryRecord],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(log).map_err(|e| StorageError::Corrupt {
        message: format!("serialize delivery log: {e}"),
    })?;
    conn.execute(
        "UPDATE alerts SET delivery_log = ?2 WHERE id = ?1",
        params![id, json],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Mark an alert resolved. Returns false when the id does not exist.
pub fn mark_resolved(
    conn: &Connection,
    id: i64,
    note: Option<&str>,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE alerts SET resolved = 1,
                               resolution_note = COALESCE(?2, resolution_note)
             WHERE id = ?1",
            params![id, note],
        )
        .map_err(sqlite_err)?;
    Ok(changed > 0)
}

/// Fetch one alert by id.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Alert>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {SELECT_COLUMNS} FROM alerts WHERE id = ?1"))
        .map_err(sqlite_err)?;

    let raw = stmt
        .query_map(params![id], read_raw)
        .map_err(sqlite_err)?
        .next()
        .transpose()
        .map_err(sqlite_err)?;

    Ok(raw.map(decode).transpose()?.map(|(alert, _)| alert))
}

/// Read-only filters over the store.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub resolved: Option<bool>,
    pub kind: Option<AlertKind>,
    pub min_severity: Option<AlertSeverity>,
    pub limit: Option<usize>,
}

/// List alerts newest-first.
pub fn list(conn: &Connection, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM alerts ORDER BY created_at DESC, id DESC"
        ))
        .map_err(sqlite_err)?;

    let raws = stmt
        .query_map([], read_raw)
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    let limit = filter.limit.unwrap_or(100);
    let mut out = Vec::new();
    for raw in raws {
        let (alert, _) = decode(raw)?;
        if let Some(resolved) = filter.resolved {
            if alert.resolved != resolved {
                continue;
            }
        }
        if let Some(kind) = filter.kind {
            if alert.kind != kind {
                continue;
            }
        }
        if let Some(min) = filter.min_severity {
            if alert.severity < min {
                continue;
            }
        }
        out.push(alert);
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertSummary {
    pub total: u64,
    pub unresolved: u64,
    pub created_since: u64,
    pub by_severity: Vec<(AlertSeverity, u64)>,
    pub by_kind: Vec<(AlertKind, u64)>,
}

/// Counts by severity and kind, plus totals. `since` bounds the
/// recent-activity counter, not the breakdowns.
pub fn summary(conn: &Connection, since: i64) -> Result<AlertSummary, StorageError> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    let unresolved: i64 = conn
        .query_row("SELECT COUNT(*) FROM alerts WHERE resolved = 0", [], |row| {
            row.get(0)
        })
        .map_err(sqlite_err)?;
    let created_since: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM alerts WHERE created_at >= ?1",
            params![since],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;

    let mut by_severity = Vec::new();
    for severity in [
        AlertSeverity::Info,
        AlertSeverity::Warning,
        AlertSeverity::Error,
        AlertSeverity::Critical,
    ] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM alerts WHERE severity = ?1",
                params![severity.as_str()],
                |row| row.get(0),
            )
            .map_err(sqlite_err)?;
        if count > 0 {
            by_severity.push((severity, count as u64));
        }
    }

    let mut by_kind = Vec::new();
    for kind in [AlertKind::Drift, AlertKind::Scan] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM alerts WHERE kind = ?1",
                params![kind.as_str()],
                |row| row.get(0),
            )
            .map_err(sqlite_err)?;
        if count > 0 {
            by_kind.push((kind, count as u64));
        }
    }

    Ok(AlertSummary {
        total: total as u64,
        unresolved: unresolved as u64,
        created_since: created_since as u64,
        by_severity,
        by_kind,
    })
}
