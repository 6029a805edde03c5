//! Type definitions for forms.
//!
//! A **form** is the single editable document: a title plus an ordered list
//! of questions. Order is display order and is significant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::question::Question;
use crate::types::{FormId, DEFAULT_FORM_TITLE};
use crate::validation::{validate, ValidationErrors};

/// The form record.
///
/// This struct is exactly the persisted record shape:
/// `{ id, title, questions: [...] }`.
///
/// # Default
///
/// `Form::default()` is the form synthesized when nothing has been stored
/// yet: id `"default"`, title `"New Form"`, no questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// Form identifier. Always `"default"` in practice.
    pub id: FormId,

    /// Display title.
    pub title: String,

    /// Questions in display order, unique by id.
    pub questions: Vec<Question>,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            id: FormId::default(),
            title: DEFAULT_FORM_TITLE.to_string(),
            questions: Vec::new(),
        }
    }
}

impl Form {
    /// Creates an empty singleton form with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: replaces the question list.
    pub fn with_questions(mut self, questions: impl IntoIterator<Item = Question>) -> Self {
        self.questions = questions.into_iter().collect();
        self
    }

    /// Looks up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id().as_str() == id)
    }

    /// Returns the display position of a question.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id().as_str() == id)
    }

    /// Inserts or replaces a question.
    ///
    /// An existing question with the same id is replaced in place, keeping
    /// its position; otherwise the question is appended. Returns the index
    /// the question ended up at.
    pub fn upsert_question(&mut self, question: Question) -> usize {
        match self.position(question.id().as_str()) {
            Some(index) => {
                self.questions[index] = question;
                index
            }
            None => {
                self.questions.push(question);
                self.questions.len() - 1
            }
        }
    }

    /// Removes every question with the given id.
    ///
    /// Returns `true` if anything was removed. Removing an absent id is not
    /// an error.
    pub fn remove_question(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id().as_str() != id);
        self.questions.len() != before
    }

    /// Questions the renderer shows, in order (everything not hidden).
    pub fn visible_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| !q.is_hidden())
    }

    /// Checks a submission against this form's questions.
    ///
    /// See [`validate`] for the rules.
    pub fn validate_submission(&self, values: &HashMap<String, String>) -> ValidationErrors {
        validate(&self.questions, values)
    }

    /// Serializes the form to its persisted JSON shape.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the form to indented JSON, for export.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
