//! Text normalization for labels and descriptions scraped from pages.

use regex::Regex;
use std::sync::LazyLock;

// SAFETY: These regexes are compile-time constants and are validated by tests.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex must compile"));
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("static regex must compile"));

/// Removes exactly one trailing `.`, if present.
pub fn strip_trailing_period(s: &str) -> &str {
    s.strip_suffix('.').unwrap_or(s)
}

/// Removes the first parenthesized substring (e.g. `(preview)`) and trims.
pub fn strip_annotations(s: &str) -> String {
    ANNOTATION_RE.replace(s, "").trim().to_string()
}

/// Replaces every run of whitespace with a single space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").into_owned()
}

/// Collapses whitespace, trims, and strips one trailing period.
pub fn clean_sentence(s: &str) -> String {
    let collapsed = collapse_whitespace(s);
    strip_trailing_period(collapsed.trim()).trim_end().to_string()
}

/// Splits an annotation-stripped command label into whitespace tokens.
pub fn label_tokens(label: &str) -> Vec<String> {
    strip_annotations(label)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
