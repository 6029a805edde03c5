//! Database schema definitions and versioning.
//!
//! This module defines the table structure for the redb storage engine.
//! All table definitions are compile-time constants to ensure consistency.
//!
//! # Schema Versioning
//!
//! The schema version is stored in the metadata table. When opening an
//! existing database, we check the version and fail if it doesn't match.
//! There is no migration path.
//!
//! # Table Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ METADATA_TABLE                                               │
//! │   Key: &str                                                  │
//! │   Value: &[u8] (bincode)                                     │
//! │   Entries: "db_metadata" -> DatabaseMetadata                 │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │ FORMS_TABLE                                                  │
//! │   Key: &str (form id, "default")                             │
//! │   Value: &[u8] (JSON form record)                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The form record is JSON rather than bincode: it is the one format that
//! must stay stable, and optional question attributes are omitted when
//! absent, which a non-self-describing encoding cannot express.

use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::form::Form;
use crate::types::Timestamp;

/// Current schema version.
///
/// Increment this when making breaking changes to the schema.
/// The database will refuse to open if versions don't match.
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Table Definitions
// ============================================================================

/// Metadata table for database-level information.
pub const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

/// Forms table.
///
/// Key: form id
/// Value: JSON-encoded [`Form`]
pub const FORMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("forms");

// ============================================================================
// Database Metadata
// ============================================================================

/// Database metadata stored in the metadata table.
///
/// This is serialized with bincode and stored under the key "db_metadata".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Schema version for compatibility checking.
    pub schema_version: u32,

    /// Timestamp when the database was created.
    pub created_at: Timestamp,

    /// Last time the database was opened (updated on each open).
    pub last_opened_at: Timestamp,
}

impl DatabaseMetadata {
    /// Creates new metadata for a fresh database.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: now,
            last_opened_at: now,
        }
    }

    /// Updates the last_opened_at timestamp.
    pub fn touch(&mut self) {
        self.last_opened_at = Timestamp::now();
    }

    /// Checks if this metadata is compatible with the current schema.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

impl Default for DatabaseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Record Encoding Helpers
// ============================================================================

/// Encodes a form record for the forms table.
#[inline]
pub fn encode_form(form: &Form) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec(form)?)
}

/// Decodes a form record read from the forms table.
#[inline]
pub fn decode_form(bytes: &[u8]) -> Result<Form, StorageError> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::corrupted(format!("Invalid form record: {}", e)))
}
