//! Question definitions.
//!
//! A **question** is one field of the form. It has:
//! - A stable id (generated with UUID v7 for new questions)
//! - A title and one of five field kinds
//! - `required` / `hidden` flags (a required question is never hidden)
//! - Kind-specific constraints: `options` for select, bounds for number
//!
//! Questions are created by the builder, changed through
//! [`QuestionUpdate`] partial updates, and persisted individually with
//! [`FormStore::save_question`](crate::FormStore::save_question).

pub mod types;

pub use types::{Question, QuestionType, QuestionUpdate};
