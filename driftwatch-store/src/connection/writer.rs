//! Write transactions.

use driftwatch_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Run a write operation inside a BEGIN IMMEDIATE transaction.
///
/// IMMEDIATE takes the write lock up front, so the fingerprint
/// check-and-insert that alert suppression depends on is atomic: no
/// other writer can slip between the lookup and the insert. The
/// transaction rolls back automatically if the closure errors out.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(
        |e| StorageError::Sqlite {
            message: format!("begin immediate: {e}"),
        },
    )?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::Sqlite {
        message: format!("commit: {e}"),
    })?;

    Ok(result)
}
