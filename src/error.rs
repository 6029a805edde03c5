//! Error types for FormStore.
//!
//! FormStore uses a hierarchical error system:
//! - `FormStoreError` is the top-level error returned by all public APIs
//! - Specific error types (`StorageError`, `SchemaError`) provide detail
//!
//! Field-level problems found while checking a submission are *not* errors
//! in this sense. They are returned as data by
//! [`validate`](crate::validate), since a form can have many
//! failing fields at once and all of them must be shown.
//!
//! # Error Handling Pattern
//! ```rust,ignore
//! use formstore::{FormStore, Config, Result};
//!
//! async fn example() -> Result<()> {
//!     let store = FormStore::open("./forms.db", Config::default())?;
//!     let form = store.get_form().await?;
//!     store.close()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias for FormStore operations.
pub type Result<T> = std::result::Result<T, FormStoreError>;

/// Top-level error enum for all FormStore operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum FormStoreError {
    /// Storage layer error (unavailable, denied, full, corrupted).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed question or form data.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of what's wrong with the configuration.
        reason: String,
    },
}

impl FormStoreError {
    /// Creates a configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a storage error.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is a schema error.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Storage-related errors.
///
/// These errors indicate problems with the underlying storage engine.
/// They are propagated unmodified through the store; nothing retries.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage engine could not be reached or opened.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The storage engine refused access (permissions, read-only media).
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Database is locked by another process.
    #[error("Database is locked by another writer")]
    DatabaseLocked,

    /// Database file or data is corrupted.
    #[error("Database corrupted: {0}")]
    Corrupted(String),

    /// Transaction failed (commit, rollback, etc.).
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the redb storage engine.
    #[error("Storage engine error: {0}")]
    Redb(String),

    /// Database schema version doesn't match expected version.
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Expected schema version.
        expected: u32,
        /// Actual schema version found in database.
        found: u32,
    },

    /// A background storage task panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl StorageError {
    /// Creates an unavailable error with the given message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates an access denied error with the given message.
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Creates a corruption error with the given message.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Creates a transaction error with the given message.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a redb error with the given message.
    pub fn redb(msg: impl Into<String>) -> Self {
        Self::Redb(msg.into())
    }
}

// Conversions from redb error types
impl From<redb::Error> for StorageError {
    fn from(err: redb::Error) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(err: redb::DatabaseError) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::Transaction(err.to_string())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::Transaction(format!("Commit failed: {}", err))
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::Redb(format!("Table error: {}", err))
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::Redb(format!("Storage error: {}", err))
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// Also allow direct conversion to FormStoreError for convenience
impl From<redb::Error> for FormStoreError {
    fn from(err: redb::Error) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<redb::DatabaseError> for FormStoreError {
    fn from(err: redb::DatabaseError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<redb::TransactionError> for FormStoreError {
    fn from(err: redb::TransactionError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<redb::CommitError> for FormStoreError {
    fn from(err: redb::CommitError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<redb::TableError> for FormStoreError {
    fn from(err: redb::TableError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<redb::StorageError> for FormStoreError {
    fn from(err: redb::StorageError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FormStoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        FormStoreError::Storage(StorageError::from(err))
    }
}

/// Structural errors in question or form data.
///
/// These errors indicate data provided by the caller (or read back from an
/// import) that does not satisfy the question/form contract. Nothing is
/// auto-corrected beyond the documented defaults.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Question type is not one of the recognized kinds.
    #[error("Unknown question type: '{0}'")]
    UnknownQuestionType(String),

    /// Two questions in one form share an id.
    #[error("Duplicate question id: {0}")]
    DuplicateQuestionId(String),

    /// Input could not be decoded at all.
    #[error("Malformed data: {0}")]
    Malformed(String),
}

impl SchemaError {
    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown question type error.
    pub fn unknown_question_type(kind: impl Into<String>) -> Self {
        Self::UnknownQuestionType(kind.into())
    }

    /// Creates a duplicate question id error.
    pub fn duplicate_question_id(id: impl ToString) -> Self {
        Self::DuplicateQuestionId(id.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Malformed(err.to_string())
    }
}
