//! Configuration errors — the only fatal class, raised before the
//! scheduling loop starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("project path is not a directory: {path}")]
    InvalidProjectPath { path: String },

    #[error("another monitor instance already holds the lock at {path}")]
    AlreadyRunning { path: String },
}
