//! Option extraction for multiple-choice segments.

use regex::Regex;
use std::sync::LazyLock;

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.\s*(.+)$").expect("option line pattern"));

/// Extract option texts, one per line matching `^[A-Z]\.\s*(.+)$` after
/// trimming, preserving source order. Returns an empty list when no lines
/// match.
pub fn extract_options(segment: &str) -> Vec<String> {
    segment
        .lines()
        .filter_map(|line| OPTION_LINE.captures(line.trim()))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}
