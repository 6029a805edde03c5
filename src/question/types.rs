//! Type definitions for questions.
//!
//! A **question** is one field definition within a form: a title, one of
//! five field kinds, and the constraints the renderer checks on submit.
//!
//! # Persisted Shape
//!
//! ```text
//! { id, title, type, required, hidden, options?, helperText?, minValue?, maxValue? }
//! ```
//!
//! Optional keys are omitted when absent; `required` and `hidden` default to
//! `false` when missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaError;
use crate::types::QuestionId;

// ============================================================================
// QuestionType
// ============================================================================

/// The kind of input a question collects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuestionType {
    /// Free text.
    #[default]
    Text,
    /// A number, optionally bounded by `min_value` / `max_value`.
    Number,
    /// One choice out of `options`.
    Select,
    /// An email address.
    Email,
    /// A phone number.
    Phone,
}

impl QuestionType {
    /// Every recognized question type, in display order.
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Text,
        QuestionType::Number,
        QuestionType::Select,
        QuestionType::Email,
        QuestionType::Phone,
    ];

    /// Returns the wire name of this type (`"text"`, `"number"`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl FromStr for QuestionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SchemaError::unknown_question_type(s))
    }
}

impl TryFrom<String> for QuestionType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Question
// ============================================================================

/// A single field definition within a form.
///
/// The id is read-only once the question exists. `required` and `hidden`
/// are private: a required question is never hidden,
/// and every mutation path ([`set_required`](Self::set_required),
/// [`set_hidden`](Self::set_hidden), [`apply`](Self::apply), the `with_*`
/// builders) keeps it that way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,

    /// Display title. Must be non-empty to pass schema validation.
    pub title: String,

    /// Field kind.
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    #[serde(default)]
    required: bool,

    #[serde(default)]
    hidden: bool,

    /// Choices for `select` questions, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Descriptive text shown alongside the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,

    /// Inclusive lower bound for `number` questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// Inclusive upper bound for `number` questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl Question {
    /// Creates a visible, optional question with no constraints.
    pub fn new(
        id: impl Into<QuestionId>,
        title: impl Into<String>,
        question_type: QuestionType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            question_type,
            required: false,
            hidden: false,
            options: None,
            helper_text: None,
            min_value: None,
            max_value: None,
        }
    }

    /// Creates the blank question the builder adds: fresh id, empty title,
    /// `text` type.
    ///
    /// A draft does not pass schema validation until it gets a title.
    pub fn draft() -> Self {
        Self::new(QuestionId::generate(), "", QuestionType::Text)
    }

    /// Builder: sets `required` (which also un-hides the question).
    pub fn with_required(mut self, required: bool) -> Self {
        self.set_required(required);
        self
    }

    /// Builder: sets `hidden` (ignored for required questions).
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.set_hidden(hidden);
        self
    }

    /// Builder: sets the select options.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: sets the helper text.
    pub fn with_helper_text(mut self, helper_text: impl Into<String>) -> Self {
        self.helper_text = Some(helper_text.into());
        self
    }

    /// Builder: sets the numeric bounds.
    pub fn with_bounds(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Unique identifier within the form. Fixed at creation.
    #[inline]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Returns true if the question must be answered.
    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if the question is excluded from rendering and validation.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Marks the question required or optional.
    ///
    /// Making a question required always makes it visible.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
        if required {
            self.hidden = false;
        }
    }

    /// Hides or shows the question.
    ///
    /// Returns `false` (and leaves the question visible) when asked to hide a
    /// required question.
    pub fn set_hidden(&mut self, hidden: bool) -> bool {
        if hidden && self.required {
            debug!(id = %self.id, "Ignoring hide on required question");
            return false;
        }
        self.hidden = hidden;
        true
    }

    /// Applies a partial update.
    ///
    /// All provided fields are merged first; if the merged question is
    /// required, it is then forced visible. The id never changes.
    pub fn apply(&mut self, update: QuestionUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(question_type) = update.question_type {
            self.question_type = question_type;
        }
        if let Some(required) = update.required {
            self.required = required;
        }
        if let Some(hidden) = update.hidden {
            self.hidden = hidden;
        }
        if let Some(options) = update.options {
            self.options = options;
        }
        if let Some(helper_text) = update.helper_text {
            self.helper_text = helper_text;
        }
        if let Some(min_value) = update.min_value {
            self.min_value = min_value;
        }
        if let Some(max_value) = update.max_value {
            self.max_value = max_value;
        }
        if self.required {
            self.hidden = false;
        }
    }

    // ------------------------------------------------------------------------
    // Select option editing
    // ------------------------------------------------------------------------

    /// Appends a placeholder option named `"Option N"`, where N is the new
    /// option count. Returns the added label.
    pub fn add_option(&mut self) -> String {
        let options = self.options.get_or_insert_with(Vec::new);
        let label = format!("Option {}", options.len() + 1);
        options.push(label.clone());
        label
    }

    /// Removes the option at `index`. Returns `false` if out of range.
    pub fn remove_option(&mut self, index: usize) -> bool {
        match self.options.as_mut() {
            Some(options) if index < options.len() => {
                options.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Replaces the option label at `index`. Returns `false` if out of range.
    pub fn set_option(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.options.as_mut().and_then(|options| options.get_mut(index)) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// The select options, or an empty slice.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// QuestionUpdate
// ============================================================================

/// Partial update for a question.
///
/// Only fields set to `Some(...)` are changed. For the optional attributes,
/// `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionUpdate {
    /// New title.
    pub title: Option<String>,

    /// New field kind.
    pub question_type: Option<QuestionType>,

    /// New required flag.
    pub required: Option<bool>,

    /// New hidden flag (overridden to `false` if the result is required).
    pub hidden: Option<bool>,

    /// Replace or clear the select options.
    pub options: Option<Option<Vec<String>>>,

    /// Replace or clear the helper text.
    pub helper_text: Option<Option<String>>,

    /// Replace or clear the lower bound.
    pub min_value: Option<Option<f64>>,

    /// Replace or clear the upper bound.
    pub max_value: Option<Option<f64>>,
}
