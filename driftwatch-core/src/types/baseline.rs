//! Observed-history baselines.
//!
//! The detector compares behavior hashes and public signatures against
//! what previous scans accepted. Baselines are loaded from the store
//! before a scan and frozen for its duration; the scheduler upserts the
//! newly observed state afterwards.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Accepted history for one monitored path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBaseline {
    /// Element id → behavior hash accepted at the last scan.
    pub behavior_hashes: FxHashMap<String, u64>,
    /// Element id → last stable signature of a public element.
    pub stable_api: FxHashMap<String, String>,
    /// Spec document hash seen at the last scan.
    pub doc_hash: Option<u64>,
    /// Spec revision seen at the last scan.
    pub revision: Option<u32>,
}

/// Immutable per-scan snapshot of baselines across all paths.
#[derive(Debug, Clone, Default)]
pub struct BaselineSnapshot {
    paths: FxHashMap<PathBuf, PathBaseline>,
}

impl BaselineSnapshot {
    pub fn new(paths: FxHashMap<PathBuf, PathBaseline>) -> Self {
        Self { paths }
    }

    pub fn get(&self, path: &Path) -> Option<&PathBaseline> {
        self.paths.get(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
