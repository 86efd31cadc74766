//! Queries for the baselines and doc_baselines tables.

use std::path::PathBuf;

use driftwatch_core::errors::StorageError;
use driftwatch_core::types::{BaselineSnapshot, PathBaseline};
use rusqlite::{params, Connection};
use rustc_hash::FxHashMap;

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

/// One element observation to fold into a path's baseline.
#[derive(Debug, Clone)]
pub struct ObservedElement {
    pub element_id: String,
    pub signature: String,
    pub behavior_hash: u64,
    pub is_public: bool,
}

/// Load every baseline row into an immutable snapshot for one scan.
pub fn load_snapshot(conn: &Connection) -> Result<BaselineSnapshot, StorageError> {
    let mut paths: FxHashMap<PathBuf, PathBaseline> = FxHashMap::default();

    let mut stmt = conn
        .prepare_cached(
            "SELECT path, element_id, signature, behavior_hash, is_public FROM baselines",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })
        .map_err(sqlite_err)?;

    for row in rows {
        let (path, element_id, signature, behavior_hash, is_public) =
            row.map_err(sqlite_err)?;
        let baseline = paths.entry(PathBuf::from(path)).or_default();
        baseline
            .behavior_hashes
            .insert(element_id.clone(), behavior_hash as u64);
        if is_public != 0 {
            baseline.stable_api.insert(element_id, signature);
        }
    }

    let mut stmt = conn
        .prepare_cached("SELECT path, doc_hash, revision FROM doc_baselines")
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .map_err(sqlite_err)?;

    for row in rows {
        let (path, doc_hash, revision) = row.map_err(sqlite_err)?;
        let baseline = paths.entry(PathBuf::from(path)).or_default();
        baseline.doc_hash = Some(doc_hash as u64);
        baseline.revision = Some(revision as u32);
    }

    Ok(BaselineSnapshot::new(paths))
}

/// Upsert the elements observed for a path during a completed scan.
pub fn upsert_elements(
    conn: &Connection,
    path: &str,
    elements: &[ObservedElement],
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO baselines
                (path, element_id, signature, behavior_hash, is_public, observed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_err)?;

    for element in elements {
        stmt.execute(params![
            path,
            element.element_id,
            element.signature,
            element.behavior_hash as i64,
            i64::from(element.is_public),
            now,
        ])
        .map_err(sqlite_err)?;
    }
    Ok(())
}

/// Upsert the spec document state seen for a path.
pub fn upsert_doc(
    conn: &Connection,
    path: &str,
    doc_hash: u64,
    revision: u32,
    now: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO doc_baselines (path, doc_hash, revision, observed_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![path, doc_hash as i64, i64::from(revision), now],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
