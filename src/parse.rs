//! Markdown question extraction engine.
//!
//! Raw text is split into per-question segments, each segment is classified,
//! options and media are pulled out, and the remaining text is normalized
//! into the question content. Extraction is best-effort throughout: malformed
//! markup is treated as "no match", and the segmentation cascade guarantees
//! at least one segment for non-empty input.

mod classify;
mod media;
mod options;
mod segment;

pub use classify::classify;
pub use media::{MediaExtraction, extract_media};
pub use options::extract_options;
pub use segment::split_segments;

use crate::model::{Question, QuestionType};
use regex::Regex;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s*").expect("leading number pattern"));
static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.\s").expect("option marker pattern"));

/// Parse markdown content into an ordered list of questions.
///
/// Never returns an empty list for non-empty input: the segmentation cascade
/// falls back to treating the whole trimmed input as one segment, and the
/// classifier falls back to [`QuestionType::Subjective`].
pub fn parse_markdown(content: &str) -> Vec<Question> {
    split_segments(content)
        .into_iter()
        .map(|segment| parse_segment(&segment))
        .collect()
}

fn parse_segment(segment: &str) -> Question {
    let question_type = classify(segment);
    let media = extract_media(segment);
    let options = if question_type == QuestionType::MultipleChoice {
        extract_options(segment)
    } else {
        Vec::new()
    };

    Question {
        content: clean_content(segment, question_type),
        question_type,
        options,
        answer: None,
        explanation: None,
        images: media.images,
        latex_formulas: media.formulas,
    }
}

/// Normalize a segment into displayable question text: image markup removed,
/// leading numbering stripped, multiple-choice content truncated at the first
/// option line, remaining lines joined with single spaces.
fn clean_content(segment: &str, question_type: QuestionType) -> String {
    let without_images = media::strip_image_tags(segment);
    let without_numbers = LEADING_NUMBER.replace_all(&without_images, "");

    let mut kept = Vec::new();
    for line in without_numbers.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if question_type == QuestionType::MultipleChoice && OPTION_MARKER.is_match(line) {
            break;
        }
        kept.push(line);
    }
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_multiple_choice_question() {
        let questions = parse_markdown("What is 2+2?\nA. 3\nB. 4\nC. 5");
        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.question_type, QuestionType::MultipleChoice);
        assert_eq!(question.options, vec!["3", "4", "5"]);
        assert_eq!(question.content, "What is 2+2?");
    }

    #[test]
    fn single_fill_in_blank_question() {
        let questions = parse_markdown("The capital of Germany is _____.");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type, QuestionType::FillInBlank);
    }

    #[test]
    fn separator_blocks_preserve_source_order_and_types() {
        let input = "\
What is 2+2?
A. 3
B. 4
---
Derive the quadratic formula starting from $ax^2 + bx + c = 0$.
---
True or False: every prime greater than 2 is odd.";
        let questions = parse_markdown(input);
        assert_eq!(questions.len(), 3);
        let types: Vec<_> = questions.iter().map(|q| q.question_type).collect();
        assert_eq!(
            types,
            vec![
                QuestionType::MultipleChoice,
                QuestionType::Subjective,
                QuestionType::TrueFalse,
            ]
        );
        assert_eq!(questions[1].latex_formulas, vec!["ax^2 + bx + c = 0"]);
    }

    #[test]
    fn numbered_questions_split_and_strip_numbering() {
        let input = "1. First question about rivers?\n2. Second question about lakes?";
        let questions = parse_markdown(input);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].content, "First question about rivers?");
        assert_eq!(questions[1].content, "Second question about lakes?");
    }

    #[test]
    fn image_markup_is_stripped_from_content() {
        let questions = parse_markdown("Identify the shape. ![diagram](img/shape.png)");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].images, vec!["img/shape.png"]);
        assert_eq!(questions[0].content, "Identify the shape.");
    }

    #[test]
    fn classification_is_idempotent_per_segment() {
        let segments = split_segments("1. Pick one.\nA. yes\nB. no\n2. Essay: discuss.");
        for segment in segments {
            assert_eq!(classify(&segment), classify(&segment));
        }
    }

    #[test]
    fn whitespace_only_input_yields_single_empty_question() {
        let questions = parse_markdown("   \n  \t\n");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type, QuestionType::Subjective);
        assert!(questions[0].content.is_empty());
    }
}
