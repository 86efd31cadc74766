//! Signature comparison helpers.
//!
//! Signatures arrive pre-normalized from the extractor, but loaders
//! and extractors disagree on whitespace, so comparison collapses runs
//! before matching. No source parsing happens here.

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize(sig: &str) -> String {
    sig.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether two signature texts describe the same shape.
pub fn signatures_match(expected: &str, actual: &str) -> bool {
    normalize(expected) == normalize(actual)
}

/// Parameter count of the first top-level parenthesized list.
/// `calc(a, b)` → 2, `calc()` → 0, `VERSION` → None.
pub fn arity(sig: &str) -> Option<usize> {
    let open = sig.find('(')?;
    let rest = &sig[open + 1..];
    let mut depth = 0usize;
    let mut count = 0usize;
    let mut seen_non_ws = false;

    for ch in rest.chars() {
        match ch {
            '(' | '[' | '<' | '{' => depth += 1,
            ')' if depth == 0 => {
                return Some(if seen_non_ws { count + 1 } else { 0 });
            }
            ')' | ']' | '>' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => count += 1,
            c if !c.is_whitespace() => seen_non_ws = true,
            _ => {}
        }
    }
    // Unbalanced parens: treat as unparseable.
    None
}

/// Whether replacing `stable` with `current` breaks callers.
/// Without type information the arity is the strongest signal we have.
pub fn is_incompatible(stable: &str, current: &str) -> bool {
    match (arity(stable), arity(current)) {
        (Some(a), Some(b)) => a != b,
        // One side stopped being callable at all.
        (Some(_), None) | (None, Some(_)) => true,
        (None, None) => !signatures_match(stable, current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_counts_top_level_params() {
        assert_eq!(arity("calc(a, b)"), Some(2));
        assert_eq!(arity("calc(a)"), Some(1));
        assert_eq!(arity("calc()"), Some(0));
        assert_eq!(arity("f(x, g(y, z))"), Some(2));
        assert_eq!(arity("f(map: Map<K, V>)"), Some(1));
        assert_eq!(arity("VERSION"), None);
    }

    #[test]
    fn normalization_ignores_whitespace_runs() {
        assert!(signatures_match("calc(a,  b)", "calc(a, b)"));
        assert!(!signatures_match("calc(a, b)", "calc(a)"));
    }

    #[test]
    fn arity_change_is_incompatible() {
        assert!(is_incompatible("calc(a, b)", "calc(a)"));
        assert!(!is_incompatible("calc(a, b)", "calc(x, y)"));
        assert!(is_incompatible("calc(a)", "CALC_TABLE"));
    }
}
