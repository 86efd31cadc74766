//! Scheduler configuration. Immutable once a monitoring session
//! starts; changing it requires a restart.

use serde::{Deserialize, Serialize};

use crate::types::DriftKind;

/// What to do when the change queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Block the producer until the scheduler drains.
    Block,
    /// Evict the oldest pending event to make room.
    DropOldest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    pub scan_interval_secs: Option<u64>,
    pub watch_patterns: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub max_cpu_percent: Option<f64>,
    pub max_memory_mb: Option<f64>,
    pub batch_size: Option<usize>,
    /// Drift kinds the detector evaluates. Empty means all.
    pub enabled_checks: Vec<DriftKind>,
    pub queue_capacity: Option<usize>,
    pub overflow: Option<OverflowPolicy>,
}

impl MonitorConfig {
    pub fn effective_scan_interval_secs(&self) -> u64 {
        self.scan_interval_secs.unwrap_or(300)
    }

    pub fn effective_watch_patterns(&self) -> Vec<String> {
        if self.watch_patterns.is_empty() {
            vec!["**/*".to_string()]
        } else {
            self.watch_patterns.clone()
        }
    }

    pub fn effective_ignore_patterns(&self) -> Vec<String> {
        if self.ignore_patterns.is_empty() {
            vec![
                "**/.git/**".to_string(),
                "**/target/**".to_string(),
                "**/node_modules/**".to_string(),
            ]
        } else {
            self.ignore_patterns.clone()
        }
    }

    pub fn effective_max_cpu_percent(&self) -> f64 {
        self.max_cpu_percent.unwrap_or(80.0)
    }

    pub fn effective_max_memory_mb(&self) -> f64 {
        self.max_memory_mb.unwrap_or(1024.0)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(32)
    }

    pub fn effective_enabled_checks(&self) -> Vec<DriftKind> {
        if self.enabled_checks.is_empty() {
            DriftKind::ALL.to_vec()
        } else {
            self.enabled_checks.clone()
        }
    }

    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(1024)
    }

    pub fn effective_overflow(&self) -> OverflowPolicy {
        self.overflow.unwrap_or(OverflowPolicy::DropOldest)
    }
}
