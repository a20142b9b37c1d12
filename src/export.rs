//! SQL export of parsed questions.
//!
//! A flat, row-per-question export intended for loading into relational
//! tooling. Every free-text field has embedded single quotes doubled before
//! being wrapped in quotes, so the generated statements stay well-formed
//! whatever the source text contained.

use crate::model::Question;

/// Render questions as SQL `INSERT` statements, one per question.
pub fn export_to_sql(questions: &[Question]) -> String {
    let mut statements = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let content = escape(&question.content);
        let question_type = question.question_type.as_str();
        let options = escape(&question.options.join(","));
        let images = escape(&question.images.join(","));

        statements.push(format!(
            "INSERT INTO questions (id, content, question_type, options, images)\n\
             VALUES ({index}, '{content}', '{question_type}', '{options}', '{images}');"
        ));
    }

    statements.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('\'', "''")
}
