//! Submission validation engine.
//!
//! [`validate`] checks submitted field values against a question set and
//! returns every failing field at once. Failures are data, not `Err`:
//! the renderer shows all of them next to their fields.
//!
//! # Rules (per question, in order)
//!
//! ```text
//! hidden?                  → skip entirely
//! value = values[id] or ""
//! required && value empty  → "This field is required"     (stop)
//! value empty              → ok                            (stop)
//! email                    → validate_email
//! phone                    → validate_phone_number
//! number                   → finite number (blank reads as 0), then min, then max
//! text / select            → ok
//! ```
//!
//! Each field keeps at most one error. For numbers the max check runs after
//! the min check and overwrites it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::question::{Question, QuestionType};
use crate::types::QuestionId;
use crate::validators::{validate_email, validate_phone_number};

/// Why a single field failed validation.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// A required field was left empty.
    Required,
    /// An email field does not look like an email address.
    InvalidEmail,
    /// A phone field does not look like a phone number.
    InvalidPhone,
    /// A number field does not hold a finite number.
    InvalidNumber,
    /// A number is below the question's `min_value`.
    BelowMin(f64),
    /// A number is above the question's `max_value`.
    AboveMax(f64),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("This field is required"),
            Self::InvalidEmail => f.write_str("Please enter a valid email address"),
            Self::InvalidPhone => f.write_str("Please enter a valid phone number"),
            Self::InvalidNumber => f.write_str("Please enter a valid number"),
            Self::BelowMin(min) => write!(f, "Value must be at least {}", min),
            Self::AboveMax(max) => write!(f, "Value must be at most {}", max),
        }
    }
}

/// Per-question validation failures.
///
/// Only questions with an error appear; a missing id means the field passed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<QuestionId, FieldError>,
}

impl ValidationErrors {
    /// Returns true if every field passed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The error recorded for a question, if any.
    pub fn get(&self, id: &str) -> Option<&FieldError> {
        self.errors.get(id)
    }

    /// The user-facing message for a question, if it failed.
    pub fn message(&self, id: &str) -> Option<String> {
        self.get(id).map(ToString::to_string)
    }

    /// Returns true if the question failed.
    pub fn contains(&self, id: &str) -> bool {
        self.errors.contains_key(id)
    }

    /// Drops the error for one field, e.g. when the user edits it again.
    pub fn clear(&mut self, id: &str) -> Option<FieldError> {
        self.errors.remove(id)
    }

    /// Iterates failing fields in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &FieldError)> {
        self.errors.iter()
    }

    /// Flattens to `question id → message`.
    pub fn to_messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(id, err)| (id.to_string(), err.to_string()))
            .collect()
    }

    fn record(&mut self, id: &QuestionId, error: FieldError) {
        self.errors.insert(id.clone(), error);
    }
}

/// Validates submitted values against a question set.
///
/// `values` maps question id to the raw submitted string; a missing entry is
/// treated as empty. Hidden questions are never checked, even when required.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use formstore::{validate, Question, QuestionType};
///
/// let questions = [Question::new("q1", "Email", QuestionType::Email).with_required(true)];
/// let errors = validate(&questions, &HashMap::new());
/// assert_eq!(errors.message("q1").as_deref(), Some("This field is required"));
/// ```
pub fn validate(questions: &[Question], values: &HashMap<String, String>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for question in questions {
        if question.is_hidden() {
            continue;
        }

        let value = values
            .get(question.id().as_str())
            .map(String::as_str)
            .unwrap_or("");

        if value.is_empty() {
            if question.is_required() {
                errors.record(question.id(), FieldError::Required);
            }
            continue;
        }

        match question.question_type {
            QuestionType::Email => {
                if !validate_email(value) {
                    errors.record(question.id(), FieldError::InvalidEmail);
                }
            }
            QuestionType::Phone => {
                if !validate_phone_number(value) {
                    errors.record(question.id(), FieldError::InvalidPhone);
                }
            }
            QuestionType::Number => check_number(question, value, &mut errors),
            QuestionType::Text | QuestionType::Select => {}
        }
    }

    errors
}

fn check_number(question: &Question, value: &str, errors: &mut ValidationErrors) {
    let Some(number) = parse_number(value) else {
        errors.record(question.id(), FieldError::InvalidNumber);
        return;
    };

    if let Some(min) = question.min_value {
        if number < min {
            errors.record(question.id(), FieldError::BelowMin(min));
        }
    }
    // Runs after the min check and overwrites it.
    if let Some(max) = question.max_value {
        if number > max {
            errors.record(question.id(), FieldError::AboveMax(max));
        }
    }
}

/// Parses a finite number, ignoring surrounding whitespace.
///
/// Whitespace-only input reads as zero, the way form number inputs coerce
/// blank text. `inf`, `NaN` and friends are rejected even though
/// `f64::from_str` accepts them.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
