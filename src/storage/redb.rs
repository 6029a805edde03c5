//! redb storage engine implementation.
//!
//! This module provides the primary storage backend for FormStore using
//! [redb](https://docs.rs/redb), a pure Rust embedded key-value store.
//!
//! # Features
//!
//! - ACID transactions with MVCC
//! - Single-writer, multiple-reader concurrency
//! - Automatic crash recovery
//!
//! # File Layout
//!
//! When you open a database at `./forms.db`, redb creates a single file at
//! that path. Tables are created on first open.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ::redb::{Database, ReadableTable};
use tracing::{debug, info, instrument, warn};

use super::schema::{
    decode_form, encode_form, DatabaseMetadata, FORMS_TABLE, METADATA_TABLE, SCHEMA_VERSION,
};
use super::StorageEngine;
use crate::error::{FormStoreError, Result, StorageError};
use crate::form::Form;

/// Metadata key in the metadata table.
const METADATA_KEY: &str = "db_metadata";

/// redb storage engine wrapper.
///
/// This struct holds the redb database handle and cached metadata.
/// It implements [`StorageEngine`] for use with FormStore.
///
/// # Thread Safety
///
/// `RedbStorage` is `Send + Sync`. redb handles internal synchronization
/// using MVCC for readers and exclusive locking for writers.
#[derive(Debug)]
pub struct RedbStorage {
    /// The redb database handle.
    db: Database,

    /// Cached database metadata.
    metadata: DatabaseMetadata,

    /// Path to the database file.
    path: PathBuf,
}

impl RedbStorage {
    /// Opens or creates a database at the given path.
    ///
    /// Idempotent: a missing database is created and initialized, an
    /// existing one is validated and its `last_opened_at` refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be created or accessed
    /// - The database is locked by another process or handle
    /// - The database file is corrupted
    /// - Schema version doesn't match
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use formstore::storage::RedbStorage;
    ///
    /// let storage = RedbStorage::open("./forms.db")?;
    /// ```
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db_exists = path.exists();

        debug!(db_exists = db_exists, "Opening storage engine");

        let db = Self::create_database(path)?;

        if db_exists {
            Self::open_existing(db, path.to_path_buf())
        } else {
            Self::initialize_new(db, path.to_path_buf())
        }
    }

    /// Creates the redb database, classifying open failures.
    fn create_database(path: &Path) -> Result<Database> {
        let db = Database::builder().create(path).map_err(|e| match e {
            ::redb::DatabaseError::DatabaseAlreadyOpen => StorageError::DatabaseLocked,
            ::redb::DatabaseError::Storage(::redb::StorageError::Io(io))
                if io.kind() == ErrorKind::PermissionDenied =>
            {
                StorageError::access_denied(format!("{}: {}", path.display(), io))
            }
            ::redb::DatabaseError::Storage(::redb::StorageError::Io(io)) => {
                StorageError::unavailable(format!("{}: {}", path.display(), io))
            }
            // redb reports cross-process lock conflicts only through the message
            other if other.to_string().contains("locked") => StorageError::DatabaseLocked,
            other => StorageError::redb(other.to_string()),
        })?;

        debug!("Database file opened successfully");
        Ok(db)
    }

    /// Initializes a new database with tables and metadata.
    #[instrument(skip(db), fields(path = %path.display()))]
    fn initialize_new(db: Database, path: PathBuf) -> Result<Self> {
        info!("Initializing new database");

        let metadata = DatabaseMetadata::new();

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(METADATA_KEY, metadata_bytes.as_slice())?;

            let _ = write_txn.open_table(FORMS_TABLE)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(schema_version = SCHEMA_VERSION, "Database initialized");

        Ok(Self { db, metadata, path })
    }

    /// Opens and validates an existing database.
    #[instrument(skip(db), fields(path = %path.display()))]
    fn open_existing(db: Database, path: PathBuf) -> Result<Self> {
        info!("Opening existing database");

        let read_txn = db.begin_read().map_err(StorageError::from)?;

        let metadata = {
            let meta_table = read_txn.open_table(METADATA_TABLE).map_err(|e| {
                StorageError::corrupted(format!("Cannot open metadata table: {}", e))
            })?;

            let metadata_bytes = meta_table
                .get(METADATA_KEY)
                .map_err(StorageError::from)?
                .ok_or_else(|| StorageError::corrupted("Missing database metadata"))?;

            bincode::deserialize::<DatabaseMetadata>(metadata_bytes.value())
                .map_err(|e| StorageError::corrupted(format!("Invalid metadata format: {}", e)))?
        };

        drop(read_txn);

        if metadata.schema_version != SCHEMA_VERSION {
            warn!(
                expected = SCHEMA_VERSION,
                found = metadata.schema_version,
                "Schema version mismatch"
            );
            return Err(FormStoreError::Storage(
                StorageError::SchemaVersionMismatch {
                    expected: SCHEMA_VERSION,
                    found: metadata.schema_version,
                },
            ));
        }

        let mut metadata = metadata;
        metadata.touch();

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(METADATA_KEY, metadata_bytes.as_slice())?;

            // Older files may predate the forms table; creating it is a no-op otherwise.
            let _ = write_txn.open_table(FORMS_TABLE)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(
            schema_version = metadata.schema_version,
            "Database opened successfully"
        );

        Ok(Self { db, metadata, path })
    }

    /// Returns a reference to the underlying redb database.
    #[inline]
    #[cfg(test)]
    pub(crate) fn database(&self) -> &Database {
        &self.db
    }
}

impl StorageEngine for RedbStorage {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    #[instrument(skip(self))]
    fn close(self: Box<Self>) -> Result<()> {
        info!("Closing storage engine");

        // redb flushes durably on drop; `Database::drop` is infallible.
        drop(self.db);

        info!("Storage engine closed");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    // =========================================================================
    // Form Record Operations
    // =========================================================================

    fn get_form(&self, id: &str) -> Result<Option<Form>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(FORMS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(decode_form(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_form(&self, form: &Form) -> Result<()> {
        let bytes = encode_form(form)?;

        let write_txn = self.db.begin_write().map_err(StorageError::from)?;
        {
            let mut table = write_txn.open_table(FORMS_TABLE)?;
            table.insert(form.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        debug!(
            id = %form.id,
            questions = form.questions.len(),
            "Form saved"
        );
        Ok(())
    }
}

// RedbStorage is auto Send + Sync: Database, DatabaseMetadata, and PathBuf
// are all Send + Sync.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Question, QuestionType};
    use tempfile::tempdir;

    fn sample_form() -> Form {
        Form::new("Contact").with_questions([
            Question::new("q1", "Email", QuestionType::Email).with_required(true),
            Question::new("q2", "Age", QuestionType::Number).with_bounds(Some(18.0), None),
        ])
    }

    #[test]
    fn test_open_creates_new_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        assert!(!path.exists());

        let storage = RedbStorage::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(storage.metadata().schema_version, SCHEMA_VERSION);

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_open_existing_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let storage = RedbStorage::open(&path).unwrap();
        let created_at = storage.metadata().created_at;
        Box::new(storage).close().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        let storage = RedbStorage::open(&path).unwrap();

        // created_at preserved, last_opened_at refreshed
        assert_eq!(storage.metadata().created_at, created_at);
        assert!(storage.metadata().last_opened_at > created_at);

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_tables_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let storage = RedbStorage::open(&path).unwrap();

        let read_txn = storage.database().begin_read().unwrap();
        read_txn.open_table(METADATA_TABLE).unwrap();
        read_txn.open_table(FORMS_TABLE).unwrap();

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_second_handle_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let storage = RedbStorage::open(&path).unwrap();
        let second = RedbStorage::open(&path);

        assert!(matches!(
            second,
            Err(FormStoreError::Storage(StorageError::DatabaseLocked))
        ));

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("test.db");

        let err = RedbStorage::open(&path).unwrap_err();
        assert!(err.is_storage());
    }

    // ====================================================================
    // Form record tests
    // ====================================================================

    #[test]
    fn test_get_absent_form_returns_none() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.db")).unwrap();

        assert!(storage.get_form("default").unwrap().is_none());

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_put_and_get_form() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.db")).unwrap();

        let form = sample_form();
        storage.put_form(&form).unwrap();

        assert_eq!(storage.get_form("default").unwrap(), Some(form));

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_put_overwrites_existing() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.db")).unwrap();

        storage.put_form(&sample_form()).unwrap();
        let replacement = Form::new("Replaced");
        storage.put_form(&replacement).unwrap();

        let stored = storage.get_form("default").unwrap().unwrap();
        assert_eq!(stored.title, "Replaced");
        assert!(stored.questions.is_empty());

        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_form_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let storage = RedbStorage::open(&path).unwrap();
        storage.put_form(&sample_form()).unwrap();
        Box::new(storage).close().unwrap();

        let storage = RedbStorage::open(&path).unwrap();
        assert_eq!(storage.get_form("default").unwrap(), Some(sample_form()));
        Box::new(storage).close().unwrap();
    }

    #[test]
    fn test_corrupt_form_record_detected() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.db")).unwrap();

        let write_txn = storage.database().begin_write().unwrap();
        {
            let mut table = write_txn.open_table(FORMS_TABLE).unwrap();
            table.insert("default", b"{not json".as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        let err = storage.get_form("default").unwrap_err();
        assert!(matches!(
            err,
            FormStoreError::Storage(StorageError::Corrupted(_))
        ));

        Box::new(storage).close().unwrap();
    }

    // ====================================================================
    // Corruption detection on open
    // ====================================================================

    #[test]
    fn test_corruption_detection_invalid_metadata_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.db");

        let storage = RedbStorage::open(&path).unwrap();
        let write_txn = storage.database().begin_write().unwrap();
        {
            let mut meta = write_txn.open_table(METADATA_TABLE).unwrap();
            meta.insert(METADATA_KEY, b"bad".as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
        Box::new(storage).close().unwrap();

        let err = RedbStorage::open(&path).unwrap_err();
        match err {
            FormStoreError::Storage(StorageError::Corrupted(msg)) => {
                assert!(
                    msg.contains("Invalid metadata format"),
                    "Error should mention invalid format, got: {}",
                    msg
                );
            }
            other => panic!("Expected StorageError::Corrupted, got: {:?}", other),
        }
    }

    #[test]
    fn test_corruption_detection_missing_metadata_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_key.db");

        let storage = RedbStorage::open(&path).unwrap();
        let write_txn = storage.database().begin_write().unwrap();
        {
            let mut meta = write_txn.open_table(METADATA_TABLE).unwrap();
            meta.remove(METADATA_KEY).unwrap();
        }
        write_txn.commit().unwrap();
        Box::new(storage).close().unwrap();

        let err = RedbStorage::open(&path).unwrap_err();
        match err {
            FormStoreError::Storage(StorageError::Corrupted(msg)) => {
                assert!(msg.contains("Missing database metadata"), "got: {}", msg);
            }
            other => panic!("Expected StorageError::Corrupted, got: {:?}", other),
        }
    }

    #[test]
    fn test_schema_version_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.db");

        let storage = RedbStorage::open(&path).unwrap();
        let write_txn = storage.database().begin_write().unwrap();
        {
            let mut meta = write_txn.open_table(METADATA_TABLE).unwrap();
            let mut stale = DatabaseMetadata::new();
            stale.schema_version = SCHEMA_VERSION + 1;
            let bytes = bincode::serialize(&stale).unwrap();
            meta.insert(METADATA_KEY, bytes.as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
        Box::new(storage).close().unwrap();

        let err = RedbStorage::open(&path).unwrap_err();
        assert!(matches!(
            err,
            FormStoreError::Storage(StorageError::SchemaVersionMismatch { found, .. })
                if found == SCHEMA_VERSION + 1
        ));
    }
}
