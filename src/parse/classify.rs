//! Question-type classification.
//!
//! An ordered list of named predicate matchers evaluated in fixed
//! precedence; the first matching predicate decides the type and
//! [`QuestionType::Subjective`] is the default. Classification is purely
//! lexical and deterministic.

use crate::model::QuestionType;

struct Matcher {
    name: &'static str,
    question_type: QuestionType,
    matches: fn(&str) -> bool,
}

const MATCHERS: [Matcher; 3] = [
    Matcher {
        name: "lettered-options",
        question_type: QuestionType::MultipleChoice,
        matches: has_option_lines,
    },
    Matcher {
        name: "true-false-marker",
        question_type: QuestionType::TrueFalse,
        matches: has_true_false_marker,
    },
    Matcher {
        name: "blank-run",
        question_type: QuestionType::FillInBlank,
        matches: has_blank_run,
    },
];

/// Classify a question segment.
pub fn classify(segment: &str) -> QuestionType {
    for matcher in &MATCHERS {
        if (matcher.matches)(segment) {
            tracing::trace!(matcher = matcher.name, "Classification predicate matched");
            return matcher.question_type;
        }
    }
    QuestionType::Subjective
}

/// At least two lines whose trimmed form starts with a letter `A`-`F`
/// (either case) followed by a dot and a space or tab. Requiring two
/// distinct lines avoids false positives from mid-sentence sequences like
/// "a. simple text".
fn has_option_lines(segment: &str) -> bool {
    let mut count = 0;
    for line in segment.lines() {
        if is_option_line(line.trim()) {
            count += 1;
            if count >= 2 {
                return true;
            }
        }
    }
    false
}

fn is_option_line(line: &str) -> bool {
    let mut chars = line.chars();
    let letter = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() && c.to_ascii_uppercase() <= 'F');
    letter && chars.next() == Some('.') && matches!(chars.next(), Some(' ' | '\t'))
}

/// Case-insensitive `true`/`false` or a locale equivalent anywhere in the
/// segment.
fn has_true_false_marker(segment: &str) -> bool {
    let lower = segment.to_lowercase();
    lower.contains("true") || lower.contains("false") || lower.contains("正确") || lower.contains("错误")
}

/// A run of at least four underscore characters.
fn has_blank_run(segment: &str) -> bool {
    segment.contains("____")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_option_lines_make_multiple_choice() {
        let segment = "Pick the answer.\nA. first\nB. second";
        assert_eq!(classify(segment), QuestionType::MultipleChoice);
    }

    #[test]
    fn lowercase_option_markers_count() {
        let segment = "Pick the answer.\na. first\nb. second";
        assert_eq!(classify(segment), QuestionType::MultipleChoice);
    }

    #[test]
    fn single_option_like_line_is_not_multiple_choice() {
        // "a. simple text" mid-prose must not flip the type on its own.
        let segment = "Consider a. simple text example and explain it.";
        assert_eq!(classify(segment), QuestionType::Subjective);
    }

    #[test]
    fn true_false_marker_detected_case_insensitively() {
        assert_eq!(
            classify("Is the following statement True?"),
            QuestionType::TrueFalse
        );
        assert_eq!(classify("判断：这个说法正确吗"), QuestionType::TrueFalse);
    }

    #[test]
    fn underscore_run_means_fill_in_blank() {
        assert_eq!(
            classify("The capital of Germany is _____."),
            QuestionType::FillInBlank
        );
    }

    #[test]
    fn option_lines_take_precedence_over_true_false() {
        let segment = "Which is true?\nA. statement one\nB. statement two";
        assert_eq!(classify(segment), QuestionType::MultipleChoice);
    }

    #[test]
    fn true_false_takes_precedence_over_blank_run() {
        let segment = "True or false: fill in ____ later.";
        assert_eq!(classify(segment), QuestionType::TrueFalse);
    }

    #[test]
    fn default_is_subjective() {
        assert_eq!(
            classify("Discuss the causes of the industrial revolution."),
            QuestionType::Subjective
        );
    }
}
