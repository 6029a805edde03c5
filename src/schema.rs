//! Structural checks for questions and forms.
//!
//! These checks guard the question/form contract wherever data enters from
//! outside the type system: JSON imports, and saves when
//! [`Config::strict_schema`](crate::Config::strict_schema) is on.
//!
//! # Validation Layers
//!
//! ```text
//! parse_form(json)
//!     ├── decode JSON, check every question's "type" key
//!     └── validate_form()
//!             ├── validate_question()   ← per question
//!             └── unique question ids
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::error::SchemaError;
use crate::form::Form;
use crate::question::{Question, QuestionType};

/// Validates a single question.
///
/// # Rules
///
/// | Field | Constraint |
/// |-------|------------|
/// | `title` | Non-empty |
/// | `type` | One of text, number, select, email, phone (enforced by [`QuestionType`]) |
/// | `required` / `hidden` | Not both true |
pub fn validate_question(question: &Question) -> Result<(), SchemaError> {
    if question.title.is_empty() {
        return Err(SchemaError::required_field("title"));
    }

    if question.is_required() && question.is_hidden() {
        return Err(SchemaError::invalid_field(
            "hidden",
            format!("question '{}' is required and cannot be hidden", question.id()),
        ));
    }

    Ok(())
}

/// Validates a form and every question in it.
///
/// Fails on the first invalid question, or on two questions sharing an id.
pub fn validate_form(form: &Form) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(form.questions.len());

    for question in &form.questions {
        validate_question(question)?;

        if !seen.insert(question.id().as_str()) {
            return Err(SchemaError::duplicate_question_id(question.id()));
        }
    }

    Ok(())
}

/// Decodes and validates a question from its JSON shape.
///
/// Missing `required` / `hidden` default to `false`.
pub fn parse_question(json: &str) -> Result<Question, SchemaError> {
    let value: Value = serde_json::from_str(json)?;
    let question = question_from_value(value)?;
    validate_question(&question)?;
    Ok(question)
}

/// Decodes and validates a form from its JSON shape.
pub fn parse_form(json: &str) -> Result<Form, SchemaError> {
    let value: Value = serde_json::from_str(json)?;

    if let Some(questions) = value.get("questions").and_then(Value::as_array) {
        for question in questions {
            check_question_type(question)?;
        }
    }

    let form: Form = serde_json::from_value(value)?;
    validate_form(&form)?;
    Ok(form)
}

fn question_from_value(value: Value) -> Result<Question, SchemaError> {
    check_question_type(&value)?;
    Ok(serde_json::from_value(value)?)
}

// Surfaces an unrecognized "type" as its own error rather than a generic
// decode failure.
fn check_question_type(value: &Value) -> Result<(), SchemaError> {
    match value.get("type") {
        None => Err(SchemaError::required_field("type")),
        Some(Value::String(kind)) => kind.parse::<QuestionType>().map(|_| ()),
        Some(other) => Err(SchemaError::unknown_question_type(other.to_string())),
    }
}
