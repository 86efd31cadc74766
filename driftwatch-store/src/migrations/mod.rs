//! Versioned schema migrations, tracked through `PRAGMA user_version`.

pub mod v001_initial;

use driftwatch_core::errors::StorageError;
use rusqlite::Connection;
use tracing::debug;

const MIGRATIONS: &[(i64, &str)] = &[(1, v001_initial::MIGRATION_SQL)];

/// Apply every migration newer than the database's current version.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::Sqlite {
            message: format!("read user_version: {e}"),
        })?;

    for (version, sql) in MIGRATIONS {
        if *version > current {
            debug!(version, "applying migration");
            conn.execute_batch(sql).map_err(|e| StorageError::Sqlite {
                message: format!("migration v{version}: {e}"),
            })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::Sqlite {
                    message: format!("set user_version: {e}"),
                })?;
        }
    }
    Ok(())
}
