//! Single-pass image and formula extraction.
//!
//! Images are every markdown `![alt](ref)` occurrence with the reference
//! captured verbatim; duplicates within a call are retained because
//! cross-question deduplication happens downstream. Formulas are display
//! `$$...$$` bodies first, then inline `$...$` candidates filtered through a
//! plausibility check so that price-like text (`$100.00$`) and unmatched
//! delimiters are rejected. Duplicate formula strings within one call are
//! suppressed, first occurrence wins.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IMAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("image tag pattern"));
static DISPLAY_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("display formula pattern"));
static INLINE_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([^\n]+?)\$").expect("inline formula pattern"));

/// Characters that make a dollar-delimited span plausible as mathematics.
const MATH_MARKERS: &[char] = &[
    '\\', '{', '}', '_', '^', '=', '+', '-', '*', '/', '<', '>', '(', ')', '[', ']',
];

/// Media captured from one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaExtraction {
    /// Image references in source order, duplicates retained.
    pub images: Vec<String>,
    /// Formula bodies in extraction order (display forms first), duplicates
    /// suppressed.
    pub formulas: Vec<String>,
}

/// Extract image references and formula bodies from a segment.
pub fn extract_media(segment: &str) -> MediaExtraction {
    let images = IMAGE_TAG
        .captures_iter(segment)
        .map(|caps| caps[1].to_string())
        .collect();

    let mut formulas = Vec::new();
    let mut seen = HashSet::new();

    // Display forms first; their spans are blanked so the leftover dollar
    // pairs cannot masquerade as inline formulas.
    let mut residual = String::with_capacity(segment.len());
    let mut cursor = 0;
    for caps in DISPLAY_FORMULA.captures_iter(segment) {
        let span = caps.get(0).expect("whole match");
        let body = caps[1].trim();
        if !body.is_empty() && seen.insert(body.to_string()) {
            formulas.push(body.to_string());
        }
        residual.push_str(&segment[cursor..span.start()]);
        residual.push(' ');
        cursor = span.end();
    }
    residual.push_str(&segment[cursor..]);

    for caps in INLINE_FORMULA.captures_iter(&residual) {
        let body = caps[1].trim();
        if !is_plausible_formula(body) {
            continue;
        }
        if seen.insert(body.to_string()) {
            formulas.push(body.to_string());
        }
    }

    MediaExtraction { images, formulas }
}

/// Remove markdown image tags from a segment, leaving the rest untouched.
pub(crate) fn strip_image_tags(segment: &str) -> String {
    IMAGE_TAG.replace_all(segment, "").into_owned()
}

fn is_plausible_formula(body: &str) -> bool {
    if body.is_empty() {
        return false;
    }
    // A dollar surviving at either edge after trimming means the candidate
    // came from an unmatched delimiter run.
    if body.starts_with('$') || body.ends_with('$') {
        return false;
    }
    body.contains(MATH_MARKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inline_formula() {
        let media = extract_media("Solve the equation: $x^2 + y^2 = z^2$");
        assert_eq!(media.formulas, vec!["x^2 + y^2 = z^2"]);
    }

    #[test]
    fn extracts_multiline_display_formula() {
        let segment = "Matrix:\n$$\n\\begin{pmatrix}\na & b \\\\\nc & d\n\\end{pmatrix}\n$$";
        let media = extract_media(segment);
        assert_eq!(media.formulas.len(), 1);
        assert!(media.formulas[0].contains("\\begin{pmatrix}"));
        assert!(media.formulas[0].contains("\\end{pmatrix}"));
    }

    #[test]
    fn display_forms_come_before_inline_forms() {
        let segment = "Derivative: $\\frac{dy}{dx}$ and integral: $$\\int f(x) dx$$";
        let media = extract_media(segment);
        assert_eq!(
            media.formulas,
            vec!["\\int f(x) dx", "\\frac{dy}{dx}"]
        );
    }

    #[test]
    fn nested_parentheses_are_plausible() {
        let media = extract_media("Function: $f(g(h(x)))$");
        assert_eq!(media.formulas, vec!["f(g(h(x)))"]);
    }

    #[test]
    fn plain_text_between_dollars_is_rejected() {
        assert!(extract_media("This is not LaTeX: $just text$").formulas.is_empty());
    }

    #[test]
    fn price_like_text_is_rejected() {
        assert!(extract_media("Price: $100.00$").formulas.is_empty());
    }

    #[test]
    fn stray_dollar_runs_yield_nothing() {
        assert!(extract_media("Test $ $ formula$").formulas.is_empty());
    }

    #[test]
    fn duplicate_formulas_are_suppressed_first_wins() {
        let media = extract_media("Twice: $x^2$ and again $x^2$ and $y_1$");
        assert_eq!(media.formulas, vec!["x^2", "y_1"]);
    }

    #[test]
    fn images_are_captured_verbatim_with_duplicates() {
        let segment = "![a](one.png) text ![b](two.png) more ![c](one.png)";
        let media = extract_media(segment);
        assert_eq!(media.images, vec!["one.png", "two.png", "one.png"]);
    }

    #[test]
    fn unterminated_markup_is_no_match() {
        let media = extract_media("broken ![alt](no-close and broken $x^2");
        assert!(media.images.is_empty());
        assert!(media.formulas.is_empty());
    }

    #[test]
    fn strip_image_tags_removes_whole_tag() {
        assert_eq!(
            strip_image_tags("before ![alt](ref.png) after"),
            "before  after"
        );
    }
}
