//! Optional AI suggestion enrichment capability.

use crate::errors::SuggestError;
use crate::types::{DriftReport, Suggestion};

/// External enrichment of rule-based suggestions.
///
/// The realignment engine invokes this under a timeout and swallows
/// every failure: an absent, failing, or slow enricher degrades to the
/// deterministic rule-based list, never to an empty result.
pub trait SuggestionEnricher: Send + Sync {
    fn enrich(&self, report: &DriftReport) -> Result<Vec<Suggestion>, SuggestError>;
}
