//! Realignment suggestions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What kind of corrective action a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    CodeChange,
    ApiUpdate,
    Refactoring,
    Documentation,
    Dependency,
    Configuration,
}

impl SuggestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeChange => "code_change",
            Self::ApiUpdate => "api_update",
            Self::Refactoring => "refactoring",
            Self::Documentation => "documentation",
            Self::Dependency => "dependency",
            Self::Configuration => "configuration",
        }
    }
}

/// One ranked corrective suggestion. Generated on demand from a drift
/// report; the core never persists these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: SuggestionCategory,
    pub title: String,
    pub description: String,
    /// 1 (nice to have) … 5 (do it now).
    pub priority: u8,
    /// 1 (minutes) … 5 (days).
    pub effort: u8,
    /// Confidence in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub snippet: Option<String>,
}
