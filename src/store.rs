//! FormStore main struct and persistence operations.
//!
//! The [`FormStore`] struct is the only writer of persisted form state. It
//! provides:
//!
//! - Opening and closing the underlying storage engine
//! - Reading the form (synthesizing an empty one on first use)
//! - Saving the whole form, or one question at a time
//! - Deleting questions
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use formstore::{Config, FormStore, Question, QuestionType};
//!
//! let store = FormStore::open("./forms.db", Config::default())?;
//!
//! // Add a question
//! let question = Question::new("email", "Your email", QuestionType::Email).with_required(true);
//! store.save_question(question).await?;
//!
//! // Read it back
//! let form = store.get_form().await?;
//! assert_eq!(form.questions.len(), 1);
//!
//! store.close()?;
//! ```
//!
//! # Concurrency
//!
//! `FormStore` is `Clone + Send + Sync`; clones share one storage engine.
//! Engine calls run on tokio's blocking pool, so every async operation must
//! be awaited inside a tokio runtime.
//!
//! `save_question` and `delete_question` each read the form and then write
//! it back as two separate engine calls. Two of them racing on the same form
//! can lose an update: the later write wins for the whole record. This is a
//! known limitation of the single-record model.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::autosave::AutoSaver;
use crate::config::Config;
use crate::error::Result;
use crate::form::Form;
use crate::question::Question;
use crate::schema::{validate_form, validate_question};
use crate::storage::{open_storage, DatabaseMetadata, MemoryStorage, StorageEngine};
use crate::types::DEFAULT_FORM_ID;

/// Shared state behind every `FormStore` clone.
struct StoreInner {
    /// Storage engine (redb, in-memory, or a caller-supplied double).
    storage: Box<dyn StorageEngine>,

    /// Configuration used to open this store.
    config: Config,
}

/// Handle to the persisted form.
///
/// Create an instance with [`FormStore::open()`] (redb on disk),
/// [`FormStore::in_memory()`], or [`FormStore::with_storage()`] to inject
/// any [`StorageEngine`]. Close it with [`FormStore::close()`].
#[derive(Clone)]
pub struct FormStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for FormStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormStore")
            .field("config", &self.inner.config)
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

impl FormStore {
    /// Opens or creates a form database at the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid (see [`Config::validate`])
    /// - The database file cannot be created or accessed
    /// - The database is corrupted or locked by another process
    /// - Schema version doesn't match
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use formstore::{Config, FormStore};
    ///
    /// let store = FormStore::open("./forms.db", Config::default())?;
    /// ```
    #[instrument(skip(config), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate()?;

        info!("Opening FormStore");

        let storage = open_storage(&path)?;

        info!(
            delete_delay = ?config.delete_delay,
            strict_schema = config.strict_schema,
            "FormStore opened successfully"
        );

        Ok(Self::from_parts(storage, config))
    }

    /// Creates a store over a caller-supplied storage engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_storage(storage: Box<dyn StorageEngine>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(storage, config))
    }

    /// Creates a store that keeps everything in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_storage(Box::new(MemoryStorage::new()), config)
    }

    fn from_parts(storage: Box<dyn StorageEngine>, config: Config) -> Self {
        Self {
            inner: Arc::new(StoreInner { storage, config }),
        }
    }

    /// Closes the store, flushing all pending writes.
    ///
    /// If other clones of this handle (for example an [`AutoSaver`]) are
    /// still alive, the engine stays open and is closed when the last one
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend reports a flush failure.
    #[instrument(skip(self))]
    pub fn close(self) -> Result<()> {
        info!("Closing FormStore");

        match Arc::try_unwrap(self.inner) {
            Ok(inner) => {
                inner.storage.close()?;
                info!("FormStore closed successfully");
            }
            Err(shared) => {
                warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "Other handles still open; storage closes when the last is dropped"
                );
            }
        }
        Ok(())
    }

    /// Returns a reference to the store configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the database metadata.
    #[inline]
    pub fn metadata(&self) -> &DatabaseMetadata {
        self.inner.storage.metadata()
    }

    /// Returns the database path, if the engine is file-backed.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.inner.storage.path()
    }

    /// Creates an [`AutoSaver`] over this store using the configured
    /// quiet period.
    pub fn autosaver(&self) -> AutoSaver {
        AutoSaver::new(self.clone(), self.inner.config.autosave_quiet_period)
    }

    // =========================================================================
    // Form Operations
    // =========================================================================

    /// Returns the persisted form.
    ///
    /// If nothing has been saved yet, returns [`Form::default()`] without
    /// writing it.
    ///
    /// # Errors
    ///
    /// Returns any storage error unmodified.
    #[instrument(skip(self))]
    pub async fn get_form(&self) -> Result<Form> {
        let stored = self
            .run_blocking(|storage| storage.get_form(DEFAULT_FORM_ID))
            .await?;

        Ok(stored.unwrap_or_else(|| {
            debug!("No stored form, synthesizing default");
            Form::default()
        }))
    }

    /// Overwrites the persisted form and returns it.
    ///
    /// The record is keyed by `form.id`.
    ///
    /// # Errors
    ///
    /// Returns a schema error if `strict_schema` is on and the form is
    /// invalid, or any storage error unmodified.
    #[instrument(skip(self, form), fields(id = %form.id, questions = form.questions.len()))]
    pub async fn save_form(&self, form: Form) -> Result<Form> {
        if self.inner.config.strict_schema {
            validate_form(&form)?;
        }

        let saved = self
            .run_blocking(move |storage| {
                storage.put_form(&form)?;
                Ok(form)
            })
            .await?;

        info!("Form saved");
        Ok(saved)
    }

    /// Inserts or replaces one question and returns it.
    ///
    /// An existing question with the same id is replaced at its current
    /// position; a new one is appended. If no form is stored yet, the
    /// default form is created to hold it.
    ///
    /// # Errors
    ///
    /// Returns a schema error if `strict_schema` is on and the question is
    /// invalid, or any storage error unmodified.
    #[instrument(skip(self, question), fields(id = %question.id()))]
    pub async fn save_question(&self, question: Question) -> Result<Question> {
        if self.inner.config.strict_schema {
            validate_question(&question)?;
        }

        let (saved, position) = self
            .run_blocking(move |storage| {
                let mut form = storage.get_form(DEFAULT_FORM_ID)?.unwrap_or_default();
                let position = form.upsert_question(question.clone());
                storage.put_form(&form)?;
                Ok((question, position))
            })
            .await?;

        debug!(position = position, "Question saved");
        Ok(saved)
    }

    /// Removes a question by id.
    ///
    /// Waits for the configured [`DeleteDelay`](crate::DeleteDelay) first.
    /// Deleting an id that isn't in the form is a no-op, not an error, and
    /// writes nothing. Returns whether a question was removed.
    ///
    /// # Errors
    ///
    /// Returns any storage error unmodified.
    #[instrument(skip(self))]
    pub async fn delete_question(&self, id: &str) -> Result<bool> {
        let delay_cfg = self.inner.config.delete_delay;
        if !delay_cfg.is_none() {
            let delay = delay_cfg.sample();
            debug!(delay_ms = delay.as_millis() as u64, "Delaying delete");
            tokio::time::sleep(delay).await;
        }

        let id = id.to_string();
        let removed = self
            .run_blocking(move |storage| {
                let Some(mut form) = storage.get_form(DEFAULT_FORM_ID)? else {
                    return Ok(false);
                };
                if !form.remove_question(&id) {
                    return Ok(false);
                }
                storage.put_form(&form)?;
                Ok(true)
            })
            .await?;

        if removed {
            info!("Question deleted");
        } else {
            debug!("Question not in form, nothing deleted");
        }
        Ok(removed)
    }

    /// Runs a storage call on the blocking thread pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn StorageEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(inner.storage.as_ref())).await?
    }
}

// FormStore is auto Send + Sync: Arc<StoreInner> where StoreInner holds a
// Box<dyn StorageEngine> (Send + Sync by trait bound) and Config.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeleteDelay;
    use crate::error::{FormStoreError, StorageError};
    use crate::question::QuestionType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn store() -> FormStore {
        FormStore::in_memory(Config::default()).unwrap()
    }

    fn question(id: &str, title: &str) -> Question {
        Question::new(id, title, QuestionType::Text)
    }

    /// Engine whose every call fails, to check errors pass through untouched.
    struct UnavailableStorage {
        metadata: DatabaseMetadata,
    }

    impl StorageEngine for UnavailableStorage {
        fn metadata(&self) -> &DatabaseMetadata {
            &self.metadata
        }
        fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
        fn path(&self) -> Option<&Path> {
            None
        }
        fn get_form(&self, _id: &str) -> Result<Option<Form>> {
            Err(StorageError::unavailable("engine offline").into())
        }
        fn put_form(&self, _form: &Form) -> Result<()> {
            Err(StorageError::unavailable("engine offline").into())
        }
    }

    /// Memory engine that counts writes.
    struct CountingStorage {
        inner: MemoryStorage,
        puts: Arc<AtomicUsize>,
    }

    impl StorageEngine for CountingStorage {
        fn metadata(&self) -> &DatabaseMetadata {
            self.inner.metadata()
        }
        fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
        fn path(&self) -> Option<&Path> {
            None
        }
        fn get_form(&self, id: &str) -> Result<Option<Form>> {
            self.inner.get_form(id)
        }
        fn put_form(&self, form: &Form) -> Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put_form(form)
        }
    }

    fn counting_store() -> (FormStore, Arc<AtomicUsize>) {
        let puts = Arc::new(AtomicUsize::new(0));
        let storage = CountingStorage {
            inner: MemoryStorage::new(),
            puts: Arc::clone(&puts),
        };
        let store = FormStore::with_storage(Box::new(storage), Config::default()).unwrap();
        (store, puts)
    }

    #[tokio::test]
    async fn test_get_form_synthesizes_default_without_writing() {
        let (store, puts) = counting_store();

        let form = store.get_form().await.unwrap();
        assert_eq!(form, Form::default());
        assert_eq!(puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_delete_writes_nothing() {
        let (store, puts) = counting_store();
        store.save_question(question("a", "First")).await.unwrap();
        assert_eq!(puts.load(Ordering::SeqCst), 1);

        store.delete_question("zzz").await.unwrap();
        assert_eq!(puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_save_question_appends_then_replaces() {
        let store = store();

        store.save_question(question("a", "First")).await.unwrap();
        store.save_question(question("b", "Second")).await.unwrap();
        store.save_question(question("a", "First, edited")).await.unwrap();

        let form = store.get_form().await.unwrap();
        let titles: Vec<_> = form.questions.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, ["First, edited", "Second"]);
    }

    #[tokio::test]
    async fn test_save_question_returns_question() {
        let store = store();
        let q = question("a", "First").with_required(true);
        assert_eq!(store.save_question(q.clone()).await.unwrap(), q);
    }

    #[tokio::test]
    async fn test_delete_question_is_idempotent() {
        let store = store();
        store.save_question(question("a", "First")).await.unwrap();
        store.save_question(question("b", "Second")).await.unwrap();

        assert!(store.delete_question("a").await.unwrap());
        let once = store.get_form().await.unwrap();

        assert!(!store.delete_question("a").await.unwrap());
        let twice = store.get_form().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_on_empty_store_is_noop() {
        let store = store();
        assert!(!store.delete_question("missing").await.unwrap());
        assert_eq!(store.get_form().await.unwrap(), Form::default());
    }

    #[tokio::test]
    async fn test_delete_delay_applies() {
        let store = FormStore::in_memory(Config {
            delete_delay: DeleteDelay::Fixed(Duration::from_millis(50)),
            ..Default::default()
        })
        .unwrap();

        let started = Instant::now();
        store.delete_question("missing").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_strict_schema_rejects_draft() {
        let store = FormStore::in_memory(Config {
            strict_schema: true,
            ..Default::default()
        })
        .unwrap();

        let err = store.save_question(Question::draft()).await.unwrap_err();
        assert!(err.is_schema());
        assert!(store.get_form().await.unwrap().questions.is_empty());
    }

    #[tokio::test]
    async fn test_lenient_schema_persists_draft() {
        let store = store();
        let draft = Question::draft();
        store.save_question(draft.clone()).await.unwrap();

        let form = store.get_form().await.unwrap();
        assert_eq!(form.questions, vec![draft]);
    }

    #[tokio::test]
    async fn test_storage_errors_propagate_unmodified() {
        let store = FormStore::with_storage(
            Box::new(UnavailableStorage {
                metadata: DatabaseMetadata::new(),
            }),
            Config::default(),
        )
        .unwrap();

        let err = store.get_form().await.unwrap_err();
        assert!(matches!(
            err,
            FormStoreError::Storage(StorageError::Unavailable(ref msg)) if msg == "engine offline"
        ));

        assert!(store.save_form(Form::default()).await.unwrap_err().is_storage());
        assert!(store.save_question(question("a", "A")).await.unwrap_err().is_storage());
        assert!(store.delete_question("a").await.unwrap_err().is_storage());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = FormStore::in_memory(Config {
            autosave_quiet_period: Duration::ZERO,
            ..Default::default()
        });
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_formstore_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<FormStore>();
    }
}
