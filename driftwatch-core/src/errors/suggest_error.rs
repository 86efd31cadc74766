//! Suggestion enrichment errors — recoverable, the engine falls back
//! to its rule-based templates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("enricher failed: {message}")]
    EnricherFailed { message: String },

    #[error("enricher did not respond within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
