//! File-change events produced by an external watcher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clock::now_millis;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A single change event. Ephemeral: consumed by the batcher and
/// discarded once the owning scan cycle completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub timestamp_ms: i64,
}

impl ChangeEvent {
    /// Create an event stamped with the current time.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp_ms: now_millis(),
        }
    }
}
