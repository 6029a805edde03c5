//! Core type definitions for FormStore identifiers and timestamps.
//!
//! Question and form identifiers are opaque strings: they travel through
//! the persisted JSON record unchanged, and callers may bring their own.
//! Freshly generated question ids use UUID v7 so they sort by creation time.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Identifier of the single form this system manages.
pub const DEFAULT_FORM_ID: &str = "default";

/// Title given to the form synthesized when nothing is stored yet.
pub const DEFAULT_FORM_TITLE: &str = "New Form";

/// Question identifier.
///
/// Unique within a form and immutable once the question is created.
///
/// # Example
/// ```
/// use formstore::QuestionId;
///
/// let id = QuestionId::generate();
/// assert!(!id.as_str().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh identifier from a UUID v7 (time-ordered).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the question ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for QuestionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Form identifier.
///
/// Only one form exists at a time; its id is [`DEFAULT_FORM_ID`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the form ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the singleton form's id.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_FORM_ID
    }
}

impl Default for FormId {
    /// Returns the singleton form id, `"default"`.
    fn default() -> Self {
        Self(DEFAULT_FORM_ID.to_string())
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    ///
    /// If the system clock is before the Unix epoch, returns a timestamp of
    /// 0 (epoch) rather than panicking.
    #[inline]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as i64)
    }

    /// Creates a timestamp from Unix milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as Unix milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_question_id_generate_is_unique() {
        let id1 = QuestionId::generate();
        let id2 = QuestionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_question_id_is_uuid() {
        let id = QuestionId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_question_id_serializes_as_plain_string() {
        let id = QuestionId::new("q1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"q1\"");
    }

    #[test]
    fn test_question_id_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(QuestionId::new("q1"), 1);
        assert_eq!(map.get("q1"), Some(&1));
    }

    #[test]
    fn test_form_id_default() {
        let id = FormId::default();
        assert_eq!(id.as_str(), "default");
        assert!(id.is_default());
        assert!(!FormId::new("other").is_default());
    }

    #[test]
    fn test_timestamp_now() {
        let t1 = Timestamp::now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let t2 = Timestamp::now();
        assert!(t1 < t2, "Timestamps should be ordered");
    }

    #[test]
    fn test_timestamp_bincode_roundtrip() {
        let ts = Timestamp::from_millis(1_700_000_000_000);
        let bytes = bincode::serialize(&ts).unwrap();
        let restored: Timestamp = bincode::deserialize(&bytes).unwrap();
        assert_eq!(ts, restored);
    }
}
