//! Normalized signature sets, as supplied by an external extractor.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One observed code element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedSignature {
    /// Normalized signature text, comparable with
    /// [`ExpectedElement::signature`](crate::types::spec::ExpectedElement).
    pub signature: String,
    /// Hash of the observed behavior (body, semantics digest).
    pub behavior_hash: u64,
}

/// Everything the extractor observed for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSignatures {
    /// Element id → observed signature.
    pub items: FxHashMap<String, ObservedSignature>,
    /// Observed dependency versions declared by the file or its manifest.
    #[serde(default)]
    pub dependencies: FxHashMap<String, String>,
}

impl FileSignatures {
    /// Signature set for a file that no longer exists.
    pub fn missing_file() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ObservedSignature> {
        self.items.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.dependencies.is_empty()
    }
}
