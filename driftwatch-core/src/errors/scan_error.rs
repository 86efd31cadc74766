//! Per-file scan errors — recoverable, retried on the next cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("signature extraction failed for {path}: {message}")]
    ExtractionFailed { path: String, message: String },

    #[error("detection panicked for {path}")]
    DetectionPanicked { path: String },
}
