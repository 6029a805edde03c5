//! # FormStore
//!
//! Form definition, submission validation, and durable persistence for a
//! single editable form.
//!
//! A form is an ordered list of questions. Each question is one of five
//! field kinds (text, number, select, email, phone) with `required` and
//! `hidden` flags and kind-specific constraints. FormStore validates
//! submitted values against the visible questions and keeps the form in an
//! embedded redb database.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formstore::{Config, FormStore, Question, QuestionType};
//! use std::collections::HashMap;
//!
//! // Open or create a database
//! let store = FormStore::open("./forms.db", Config::default())?;
//!
//! // Add questions
//! store.save_question(Question::new("name", "Your name", QuestionType::Text).with_required(true)).await?;
//! store.save_question(Question::new("age", "Age", QuestionType::Number).with_bounds(Some(0.0), Some(120.0))).await?;
//!
//! // Validate a submission
//! let form = store.get_form().await?;
//! let values = HashMap::from([("age".to_string(), "200".to_string())]);
//! let errors = form.validate_submission(&values);
//! assert_eq!(errors.message("name").as_deref(), Some("This field is required"));
//! assert_eq!(errors.message("age").as_deref(), Some("Value must be at most 120"));
//!
//! // Clean up
//! store.close()?;
//! ```
//!
//! ## Key Concepts
//!
//! ### Form
//!
//! There is one form, keyed `"default"`. Reading it before anything was
//! saved yields an empty form titled "New Form" without writing it.
//!
//! ### Question
//!
//! A required question is never hidden: every update path that sets
//! `required` clears `hidden`, and hiding a required question is ignored.
//!
//! ### Validation
//!
//! [`validate`] is a pure function over a question list and a map of raw
//! string values. Hidden questions are skipped; empty optional values pass;
//! at most one error is reported per question.
//!
//! ### Autosave
//!
//! [`AutoSaver`] debounces question edits so that a burst of changes to a
//! question produces one write after a quiet period. Each question has its
//! own pending save.
//!
//! ## Thread Safety
//!
//! `FormStore` is `Clone + Send + Sync`. Async operations run the storage
//! engine on tokio's blocking pool; the database uses MVCC for concurrent
//! reads with exclusive write locking.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============================================================================
// Module declarations
// ============================================================================

mod autosave;
mod config;
mod error;
mod store;
mod types;
mod validation;

pub mod schema;
pub mod storage;
pub mod validators;

// Domain modules
mod form;
mod question;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main store interface
pub use store::FormStore;

// Autosave
pub use autosave::{AutoSaver, SaveOutcome};

// Configuration
pub use config::{Config, DeleteDelay, DEFAULT_AUTOSAVE_QUIET_PERIOD};

// Error handling
pub use error::{FormStoreError, Result, SchemaError, StorageError};

// Core types
pub use types::{FormId, QuestionId, Timestamp, DEFAULT_FORM_ID, DEFAULT_FORM_TITLE};

// Domain types
pub use form::Form;
pub use question::{Question, QuestionType, QuestionUpdate};

// Validation
pub use schema::{parse_form, parse_question};
pub use validation::{validate, FieldError, ValidationErrors};
pub use validators::{validate_email, validate_phone_number};

// Storage (for advanced users)
pub use storage::{DatabaseMetadata, StorageEngine};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common FormStore usage.
///
/// ```rust
/// use formstore::prelude::*;
/// ```
pub mod prelude {
    pub use crate::autosave::AutoSaver;
    pub use crate::config::Config;
    pub use crate::error::{FormStoreError, Result};
    pub use crate::form::Form;
    pub use crate::question::{Question, QuestionType, QuestionUpdate};
    pub use crate::store::FormStore;
    pub use crate::types::QuestionId;
    pub use crate::validation::{validate, ValidationErrors};
}
