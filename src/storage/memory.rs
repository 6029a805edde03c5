//! In-memory storage engine.
//!
//! Keeps encoded form records in a map behind a lock. Nothing survives the
//! process; useful for tests, previews, and as an injectable test double.
//! Records go through the same JSON encoding as [`RedbStorage`](super::RedbStorage),
//! so a stored form never aliases the caller's value.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use tracing::debug;

use super::schema::{decode_form, encode_form, DatabaseMetadata};
use super::StorageEngine;
use crate::error::{Result, StorageError};
use crate::form::Form;

/// Volatile [`StorageEngine`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, Vec<u8>>>,
    metadata: DatabaseMetadata,
}

impl MemoryStorage {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored form records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::unavailable("in-memory store lock poisoned")
}

impl StorageEngine for MemoryStorage {
    fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn get_form(&self, id: &str) -> Result<Option<Form>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        match records.get(id) {
            Some(bytes) => Ok(Some(decode_form(bytes)?)),
            None => Ok(None),
        }
    }

    fn put_form(&self, form: &Form) -> Result<()> {
        let bytes = encode_form(form)?;
        self.records
            .write()
            .map_err(|_| poisoned())?
            .insert(form.id.as_str().to_string(), bytes);

        debug!(id = %form.id, questions = form.questions.len(), "Form saved in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Question, QuestionType};

    #[test]
    fn test_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert!(storage.get_form("default").unwrap().is_none());
        assert!(storage.path().is_none());
    }

    #[test]
    fn test_put_and_get() {
        let storage = MemoryStorage::new();
        let form = Form::new("Memo").with_questions([Question::new(
            "q1",
            "Phone",
            QuestionType::Phone,
        )]);

        storage.put_form(&form).unwrap();
        storage.put_form(&form).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get_form("default").unwrap(), Some(form));
    }
}
