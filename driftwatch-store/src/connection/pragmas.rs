//! Connection pragmas.

use driftwatch_core::errors::StorageError;
use rusqlite::Connection;

fn set(conn: &Connection, name: &str, value: &dyn rusqlite::ToSql) -> Result<(), StorageError> {
    conn.pragma_update(None, name, value)
        .map_err(|e| StorageError::Sqlite {
            message: format!("pragma {name}: {e}"),
        })
}

/// Pragmas for the write connection: WAL for concurrent readers,
/// NORMAL sync (WAL makes it durable enough), a busy timeout so
/// checkpoint contention surfaces as waiting rather than SQLITE_BUSY.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    set(conn, "journal_mode", &"WAL")?;
    set(conn, "synchronous", &"NORMAL")?;
    set(conn, "foreign_keys", &"ON")?;
    set(conn, "busy_timeout", &5_000)?;
    Ok(())
}

/// Pragmas for pooled read connections.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    set(conn, "query_only", &"ON")?;
    set(conn, "busy_timeout", &5_000)?;
    Ok(())
}
