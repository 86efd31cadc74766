//! Specification availability errors — surfaced as an info-tagged
//! empty report, never as an alert.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("no specification loaded for {path}")]
    NotLoaded { path: String },

    #[error("specification {name} is invalid: {message}")]
    Invalid { name: String, message: String },
}
