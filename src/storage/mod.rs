//! Storage layer abstractions for FormStore.
//!
//! This module provides a trait-based abstraction over the storage engine,
//! allowing different backends to be used (redb on disk, in-memory for
//! tests and ephemeral forms).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FormStore                               │
//! │                         │                                    │
//! │                         ▼                                    │
//! │              ┌─────────────────────┐                        │
//! │              │   StorageEngine     │  ← Trait               │
//! │              └─────────────────────┘                        │
//! │                    ▲         ▲                              │
//! │                    │         │                              │
//! │         ┌─────────┴─┐   ┌───┴───────────┐                  │
//! │         │RedbStorage│   │ MemoryStorage │                  │
//! │         └───────────┘   └───────────────┘                  │
//! │           (disk)           (tests, ephemeral)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a durable key-value service for exactly one record type,
//! the [`Form`], addressed by its string id.

pub mod memory;
pub mod redb;
pub mod schema;

pub use self::memory::MemoryStorage;
pub use self::redb::RedbStorage;
pub use schema::{DatabaseMetadata, SCHEMA_VERSION};

use std::path::Path;

use crate::error::Result;
use crate::form::Form;

/// Storage engine trait for FormStore.
///
/// Calls are synchronous; [`FormStore`](crate::FormStore) moves them onto
/// the blocking thread pool.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow the store to be shared
/// across threads and tasks. The engine handles internal synchronization.
pub trait StorageEngine: Send + Sync {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns the database metadata.
    fn metadata(&self) -> &DatabaseMetadata;

    /// Closes the storage engine, flushing any pending writes.
    ///
    /// This method consumes the storage engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend supports reporting flush failures.
    fn close(self: Box<Self>) -> Result<()>;

    /// Returns the path to the database file, if applicable.
    fn path(&self) -> Option<&Path>;

    // =========================================================================
    // Form Record Operations
    // =========================================================================

    /// Retrieves the form stored under `id`.
    ///
    /// Returns `None` if nothing has been stored under that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or decoding fails.
    fn get_form(&self, id: &str) -> Result<Option<Form>>;

    /// Upserts a form, keyed by its own `id`.
    ///
    /// Each call opens and commits its own write transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or encoding fails (disk full,
    /// permissions, ...).
    fn put_form(&self, form: &Form) -> Result<()>;
}

/// Opens a storage engine at the given path.
///
/// This is a convenience function that creates a [`RedbStorage`] instance.
/// Opening is idempotent: an existing database is validated and reused, a
/// missing one is created.
///
/// # Errors
///
/// Returns an error if:
/// - The database file is corrupted
/// - The database is locked by another process
/// - The file cannot be created or accessed
/// - Schema version doesn't match
pub fn open_storage(path: impl AsRef<Path>) -> Result<Box<dyn StorageEngine>> {
    let storage = RedbStorage::open(path)?;
    Ok(Box::new(storage))
}
