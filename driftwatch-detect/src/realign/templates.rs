//! Rule-based suggestion templates, one per drift kind.

use std::path::Path;

use driftwatch_core::types::{
    DriftItem, DriftKind, DriftSeverity, Suggestion, SuggestionCategory,
};

use crate::detector::classify::arity;

/// Severity → priority, on the 1–5 suggestion scale.
pub fn priority_for(severity: DriftSeverity) -> u8 {
    match severity {
        DriftSeverity::Critical => 5,
        DriftSeverity::High => 4,
        DriftSeverity::Medium => 3,
        DriftSeverity::Low => 2,
        DriftSeverity::Info => 1,
    }
}

/// Effort estimate on the 1–5 scale.
///
/// The base cost comes from the kind; wide signatures add one because
/// they mean more call sites to touch.
pub fn effort_for(item: &DriftItem) -> u8 {
    let base: u8 = match item.kind {
        DriftKind::MissingImplementation => 4,
        DriftKind::ApiBreakingChange => 4,
        DriftKind::BehaviorDeviation => 3,
        DriftKind::SignatureMismatch => 2,
        DriftKind::DependencyDrift => 2,
        DriftKind::DocumentationStale => 1,
    };
    let wide = item
        .expected
        .as_deref()
        .and_then(arity)
        .is_some_and(|n| n >= 3);
    (base + u8::from(wide)).clamp(1, 5)
}

/// Deterministic suggestion for one drift item.
pub fn suggestion_for(item: &DriftItem, file: &Path) -> Suggestion {
    let (category, title, description, snippet) = match item.kind {
        DriftKind::MissingImplementation => (
            SuggestionCategory::CodeChange,
            format!("Implement missing element '{}'", item.element_id),
            format!(
                "The specification expects '{}' in {} but no implementation was found. \
                 Add it with the expected signature.",
                item.element_id,
                file.display()
            ),
            item.expected.clone(),
        ),
        DriftKind::SignatureMismatch => (
            SuggestionCategory::CodeChange,
            format!("Align signature of '{}'", item.element_id),
            format!(
                "The implementation of '{}' does not match its specified signature. \
                 Change the implementation, or update the spec if the change was intended.",
                item.element_id
            ),
            item.expected.clone(),
        ),
        DriftKind::BehaviorDeviation => (
            SuggestionCategory::Refactoring,
            format!("Review behavior change in '{}'", item.element_id),
            format!(
                "The body of '{}' changed since the last accepted scan while its \
                 signature stayed the same. Confirm the new behavior still satisfies \
                 the spec, then re-baseline.",
                item.element_id
            ),
            None,
        ),
        DriftKind::DocumentationStale => (
            SuggestionCategory::Documentation,
            format!("Catch up with spec revision for '{}'", item.element_id),
            "The specification document was revised but the code has not moved. \
             Review the new revision and implement or dispute its changes."
                .to_string(),
            None,
        ),
        DriftKind::DependencyDrift => (
            SuggestionCategory::Dependency,
            format!("Update dependency '{}'", item.element_id),
            format!(
                "Dependency '{}' diverged from the declared version. Pin it back or \
                 update the declaration.",
                item.element_id
            ),
            None,
        ),
        DriftKind::ApiBreakingChange => (
            SuggestionCategory::ApiUpdate,
            format!("Restore or version the public API '{}'", item.element_id),
            format!(
                "A previously stable public element '{}' was removed or changed \
                 incompatibly. Restore the old surface, or ship the break behind a \
                 version bump and update the spec.",
                item.element_id
            ),
            item.expected.clone(),
        ),
    };

    Suggestion {
        category,
        title,
        description,
        priority: priority_for(item.severity),
        effort: effort_for(item),
        confidence: item.confidence,
        file: Some(file.to_path_buf()),
        line: item.line,
        snippet,
    }
}
