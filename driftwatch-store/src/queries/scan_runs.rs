//! Queries for the scan_runs table — append-only log of scheduler cycles.

use driftwatch_core::errors::StorageError;
use rusqlite::{params, Connection};

#[derive(Debug, Clone)]
pub struct ScanRunRow {
    pub id: i64,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub files_checked: Option<i64>,
    pub reports_produced: Option<i64>,
    pub alerts_created: Option<i64>,
    pub alerts_suppressed: Option<i64>,
    pub scan_errors: Option<i64>,
    pub throttled: bool,
    pub duration_ms: Option<i64>,
    pub status: String,
    pub error: Option<String>,
}

/// Completion data for one cycle.
#[derive(Debug, Clone, Default)]
pub struct ScanRunUpdate {
    pub files_checked: i64,
    pub reports_produced: i64,
    pub alerts_created: i64,
    pub alerts_suppressed: i64,
    pub scan_errors: i64,
    pub throttled: bool,
    pub duration_ms: i64,
    pub status: String,
    pub error: Option<String>,
}

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

/// Insert a new run (status = 'running'). Returns the row id.
pub fn insert_start(conn: &Connection, started_at: i64) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO scan_runs (started_at, status) VALUES (?1, 'running')",
        params![started_at],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Fill in a run's completion data.
pub fn complete(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    update: &ScanRunUpdate,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE scan_runs SET
            completed_at = ?2, files_checked = ?3, reports_produced = ?4,
            alerts_created = ?5, alerts_suppressed = ?6, scan_errors = ?7,
            throttled = ?8, duration_ms = ?9, status = ?10, error = ?11
         WHERE id = ?1",
        params![
            id,
            completed_at,
            update.files_checked,
            update.reports_produced,
            update.alerts_created,
            update.alerts_suppressed,
            update.scan_errors,
            i64::from(update.throttled),
            update.duration_ms,
            update.status,
            update.error,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Query the most recent runs.
pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<ScanRunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, files_checked, reports_produced,
                    alerts_created, alerts_suppressed, scan_errors, throttled,
                    duration_ms, status, error
             FROM scan_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ScanRunRow {
                id: row.get(0)?,
                started_at: row.get(1)?,
                completed_at: row.get(2)?,
                files_checked: row.get(3)?,
                reports_produced: row.get(4)?,
                alerts_created: row.get(5)?,
                alerts_suppressed: row.get(6)?,
                scan_errors: row.get(7)?,
                throttled: row.get::<_, i64>(8)? != 0,
                duration_ms: row.get(9)?,
                status: row.get(10)?,
                error: row.get(11)?,
            })
        })
        .map_err(sqlite_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Count total runs.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM scan_runs", [], |row| row.get(0))
        .map_err(sqlite_err)
}
