//! Phone-number normalization.
//!
//! The canonical form is E.164-like: a leading `+` followed by 10 to 15
//! decimal digits, nothing else.

use std::sync::OnceLock;

use regex::Regex;

static CANONICAL: OnceLock<Regex> = OnceLock::new();

fn canonical_pattern() -> &'static Regex {
    CANONICAL.get_or_init(|| Regex::new(r"^\+\d{10,15}$").expect("canonical pattern is valid"))
}

/// Filter raw phone-number strings down to canonical form.
///
/// Spaces and hyphens are stripped before matching; entries that still do
/// not match the canonical pattern are silently dropped. Output order
/// follows input order and duplicates are kept. An empty result is valid;
/// callers that require a non-empty set must check for themselves.
pub fn clean_numbers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|n| n.replace([' ', '-'], ""))
        .filter(|n| canonical_pattern().is_match(n))
        .collect()
}
