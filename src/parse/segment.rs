//! Splitting raw text into per-question segments.
//!
//! Four heuristics run in fixed precedence: numbered-list markers, `---`
//! separator lines, runs of two or more blank lines, and finally the whole
//! trimmed input as a single segment. A candidate split is accepted only
//! when it yields more than one non-empty segment.

use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("numbered line pattern"));

/// Split markdown content into question segments.
pub fn split_segments(content: &str) -> Vec<String> {
    for candidate in [split_numbered, split_separated, split_blank_runs] {
        let segments = candidate(content);
        if segments.len() > 1 {
            return segments;
        }
    }
    vec![content.trim().to_string()]
}

/// True for a line that opens a numbered question (`1. `, `23. ` ...).
pub(crate) fn is_numbered_line(line: &str) -> bool {
    NUMBERED_LINE.is_match(line)
}

/// True for a line consisting solely of a `---` or `***` separator.
fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == "---" || trimmed == "***"
}

/// Segments begin at numbered lines and end at the next numbered line, a
/// separator line, a blank line, or end of input. Text outside any numbered
/// segment is not question material in this mode.
fn split_numbered(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        if is_numbered_line(line) {
            push_segment(&mut segments, current.take());
            current = Some(line.to_string());
        } else if current.is_some() {
            if line.trim().is_empty() || is_separator_line(line) {
                push_segment(&mut segments, current.take());
            } else if let Some(segment) = current.as_mut() {
                segment.push('\n');
                segment.push_str(line);
            }
        }
    }
    push_segment(&mut segments, current.take());
    segments
}

/// Segments bounded by `---` lines. Within a block, a segment ends early at
/// a blank line or at a later numbered line.
fn split_separated(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim() == "---" {
            push_segment(&mut segments, block_segment(&block));
            block.clear();
        } else {
            block.push(line);
        }
    }
    push_segment(&mut segments, block_segment(&block));
    segments
}

fn block_segment(block: &[&str]) -> Option<String> {
    let mut lines = block.iter().skip_while(|line| line.trim().is_empty());
    let first = lines.next()?;
    let mut segment = first.to_string();
    for line in lines {
        if line.trim().is_empty() || is_numbered_line(line) {
            break;
        }
        segment.push('\n');
        segment.push_str(line);
    }
    Some(segment)
}

/// Split on any run of two or more blank lines. Single blank lines stay
/// inside their segment.
fn split_blank_runs(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blanks = 0usize;

    for line in content.lines() {
        if line.trim().is_empty() {
            blanks += 1;
            continue;
        }
        if blanks >= 2 && !current.is_empty() {
            push_segment(&mut segments, Some(current.join("\n")));
            current.clear();
        } else if blanks == 1 && !current.is_empty() {
            current.push("");
        }
        blanks = 0;
        current.push(line);
    }
    if !current.is_empty() {
        push_segment(&mut segments, Some(current.join("\n")));
    }
    segments
}

fn push_segment(segments: &mut Vec<String>, candidate: Option<String>) {
    if let Some(candidate) = candidate {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_lines_win_over_other_heuristics() {
        let input = "1. One?\n2. Two?\n\n\n3. Three?";
        let segments = split_segments(input);
        assert_eq!(segments, vec!["1. One?", "2. Two?", "3. Three?"]);
    }

    #[test]
    fn numbered_segments_carry_their_option_lines() {
        let input = "1. Pick one.\nA. yes\nB. no\n2. Next?";
        let segments = split_segments(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "1. Pick one.\nA. yes\nB. no");
    }

    #[test]
    fn separator_lines_bound_segments() {
        let input = "First block?\n---\nSecond block?\n---\nThird block?";
        let segments = split_segments(input);
        assert_eq!(
            segments,
            vec!["First block?", "Second block?", "Third block?"]
        );
    }

    #[test]
    fn blank_line_runs_split_when_nothing_else_matches() {
        let input = "First paragraph question.\n\n\nSecond paragraph question.";
        let segments = split_segments(input);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn single_blank_line_does_not_split() {
        let input = "Question stem.\n\nIts continuation on a later line.";
        let segments = split_segments(input);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn fallback_returns_whole_trimmed_input() {
        let segments = split_segments("  just one question  ");
        assert_eq!(segments, vec!["just one question"]);
    }

    #[test]
    fn never_returns_empty_for_nonempty_input() {
        for input in ["x", "---", "1. ", "\n\nword\n\n"] {
            assert!(!split_segments(input).is_empty(), "input: {input:?}");
        }
    }

    #[test]
    fn segments_reproduce_significant_content_in_order() {
        let input = "1. Alpha?\n2. Beta?\n3. Gamma?";
        let joined = split_segments(input).join("\n");
        assert_eq!(joined, input);
    }
}
