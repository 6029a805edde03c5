//! The form document.
//!
//! Only one form exists at a time, keyed by
//! [`DEFAULT_FORM_ID`](crate::DEFAULT_FORM_ID). It is created lazily:
//! reading before anything was saved yields [`Form::default()`], which is
//! not persisted until explicitly saved.

pub mod types;

pub use types::Form;
