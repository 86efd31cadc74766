//! Persistence errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    #[error("stored value failed to deserialize: {message}")]
    Corrupt { message: String },

    #[error("no alert with id {id}")]
    NotFound { id: i64 },
}
