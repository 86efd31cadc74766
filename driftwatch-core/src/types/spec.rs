//! Normalized specification data, as supplied by an external loader.
//!
//! The core never parses OpenAPI, Markdown, or any other concrete spec
//! format. A loader hands over this normalized shape and the core holds
//! a read-only `Arc<Specification>` per monitored path.

use serde::{Deserialize, Serialize};

/// One element the specification expects to exist in the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedElement {
    /// Stable identifier (function name, endpoint, type).
    pub id: String,
    /// Expected signature in the extractor's normalized text form.
    pub signature: String,
    /// Human-readable expected behavior.
    #[serde(default)]
    pub behavior: String,
    /// Hash of the expected behavior description, if the loader computes one.
    #[serde(default)]
    pub behavior_hash: Option<u64>,
    /// Element is part of the public surface.
    #[serde(default)]
    pub is_public: bool,
    /// Removing or breaking this element is a contract violation.
    #[serde(default)]
    pub is_breaking_if_removed: bool,
}

/// A dependency the specification pins to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub name: String,
    pub version: String,
}

/// A loaded, normalized specification for one monitored path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    /// Where this spec came from (file path, URL, document id).
    pub source_ref: String,
    /// Monotonically increasing revision of the spec document.
    #[serde(default)]
    pub revision: u32,
    /// Hash of the spec document content.
    #[serde(default)]
    pub doc_hash: u64,
    /// Ordered expected elements. Report ordering follows this order.
    pub elements: Vec<ExpectedElement>,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
}

impl Specification {
    pub fn element(&self, id: &str) -> Option<&ExpectedElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}
