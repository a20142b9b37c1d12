//! Core data types shared by the parser, the deduplicator, and persistence.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Structural category assigned to a question by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// At least two lettered option lines.
    MultipleChoice,
    /// Contains a true/false marker (or a locale equivalent).
    TrueFalse,
    /// Contains a blank run of underscores.
    FillInBlank,
    /// Default when no structural pattern matches.
    Subjective,
}

impl QuestionType {
    /// Stable string form used in persisted documents and the SQL export.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::FillInBlank => "fill_in_blank",
            Self::Subjective => "subjective",
        }
    }
}

/// A single parsed question. Immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Normalized question text with markup and numbering stripped.
    pub content: String,
    /// Structural category of the question.
    pub question_type: QuestionType,
    /// Option texts in source order; populated only for multiple choice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Answer text when one was present in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Explanation text when one was present in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Image references captured from the segment, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// LaTeX formula bodies captured from the segment, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub latex_formulas: Vec<String>,
}

/// A labeled choice shared between questions, deduplicated by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRecord {
    /// Option letter (`A`, `B`, ...).
    pub label: String,
    /// Option text without the letter prefix.
    pub content: String,
}

impl OptionRecord {
    /// Digest over the canonical `label:content` form.
    pub fn digest(&self) -> String {
        compute_digest(&format!("{}:{}", self.label, self.content))
    }
}

/// An image reference shared between questions, deduplicated by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Reference string captured verbatim from the markdown image tag.
    pub reference: String,
}

impl ImageRecord {
    /// Digest over the reference string.
    pub fn digest(&self) -> String {
        compute_digest(&self.reference)
    }
}

/// A LaTeX formula shared between questions, deduplicated by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaRecord {
    /// Formula body without the dollar delimiters.
    pub formula: String,
}

impl FormulaRecord {
    /// Digest over the formula body.
    pub fn digest(&self) -> String {
        compute_digest(&self.formula)
    }
}

/// Persisted form of a [`Question`] with shared sub-entities replaced by
/// their store identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDocument {
    /// Document identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Normalized question text.
    pub content: String,
    /// Structural category of the question.
    pub question_type: QuestionType,
    /// Identifiers of deduplicated option records, in source order.
    pub options: Vec<String>,
    /// Answer text when one was present in the source.
    pub answer: Option<String>,
    /// Explanation text when one was present in the source.
    pub explanation: Option<String>,
    /// Identifiers of deduplicated image records, in source order.
    pub images: Vec<String>,
    /// Identifiers of deduplicated formula records, in source order.
    pub latex_formulas: Vec<String>,
    /// RFC3339 timestamp recorded when the document was assembled.
    pub created_at: String,
}

impl QuestionDocument {
    /// Assemble a persisted document from a parsed question and the store
    /// identifiers resolved for its sub-entities.
    pub fn assemble(
        question: &Question,
        options: Vec<String>,
        images: Vec<String>,
        latex_formulas: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: question.content.clone(),
            question_type: question.question_type,
            options,
            answer: question.answer.clone(),
            explanation: question.explanation.clone(),
            images,
            latex_formulas,
            created_at: current_timestamp_rfc3339(),
        }
    }
}

/// Compute a deterministic SHA-256 hex digest for a canonical content string.
pub fn compute_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Current timestamp formatted for document storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable() {
        let h1 = compute_digest("Hello world");
        let h2 = compute_digest("Hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn option_digest_covers_label_and_content() {
        let a = OptionRecord {
            label: "A".into(),
            content: "4".into(),
        };
        let b = OptionRecord {
            label: "B".into(),
            content: "4".into(),
        };
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), compute_digest("A:4"));
    }

    #[test]
    fn question_type_serializes_snake_case() {
        let json = serde_json::to_string(&QuestionType::MultipleChoice).unwrap();
        assert_eq!(json, "\"multiple_choice\"");
        assert_eq!(QuestionType::FillInBlank.as_str(), "fill_in_blank");
    }

    #[test]
    fn timestamp_is_rfc3339_like() {
        let ts = current_timestamp_rfc3339();
        assert!(ts.contains('T') && ts.ends_with('Z'));
    }

    #[test]
    fn assembled_document_carries_resolved_ids() {
        let question = Question {
            content: "What is 2+2?".into(),
            question_type: QuestionType::MultipleChoice,
            options: vec!["3".into(), "4".into()],
            answer: None,
            explanation: None,
            images: Vec::new(),
            latex_formulas: Vec::new(),
        };
        let doc = QuestionDocument::assemble(
            &question,
            vec!["opt-1".into(), "opt-2".into()],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(doc.content, question.content);
        assert_eq!(doc.options, vec!["opt-1", "opt-2"]);
        assert!(!doc.id.is_empty());
    }
}
