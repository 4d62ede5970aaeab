//! Storage trait definitions for the proctoring evidence store
//!
//! - `CollectionName`: the closed set of collections the store recognizes
//! - `Filter`: a field-equality query (empty filter matches everything)
//! - `EvidenceStore`: read / write-once / clear over named collections
//!
//! The trait is async and backend-agnostic. An in-memory fake is provided
//! for testing via the `fakes` module.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A stored document: a flat JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Serialize any record into a [`Document`].
///
/// Fails with `StorageError::Malformed` when the value does not serialize
/// to a JSON object.
pub fn document_from<T: Serialize>(record: &T) -> StorageResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(doc) => Ok(doc),
        other => Err(StorageError::Malformed(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// CollectionName
// ---------------------------------------------------------------------------

/// Named evidence collections.
///
/// The wire name (what the backend calls the table) differs from the logical
/// name for three of them: registrations live in `test`, exam reports in
/// `reports` and flagged photos in `ObjectDetectionData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionName {
    Screenshot,
    OutOfFrame,
    Blur,
    PeriodicPhotos,
    Conversations,
    Registration,
    Report,
    FlaggedPhoto,
}

impl CollectionName {
    pub const ALL: [CollectionName; 8] = [
        CollectionName::Screenshot,
        CollectionName::OutOfFrame,
        CollectionName::Blur,
        CollectionName::PeriodicPhotos,
        CollectionName::Conversations,
        CollectionName::Registration,
        CollectionName::Report,
        CollectionName::FlaggedPhoto,
    ];

    /// Table name used by the backing store.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Screenshot => "screenshot",
            CollectionName::OutOfFrame => "outOfFrame",
            CollectionName::Blur => "blur",
            CollectionName::PeriodicPhotos => "periodicPhotos",
            CollectionName::Conversations => "conversations",
            CollectionName::Registration => "test",
            CollectionName::Report => "reports",
            CollectionName::FlaggedPhoto => "ObjectDetectionData",
        }
    }

    /// Logical name, as used in configuration and on the command line.
    pub fn logical_name(&self) -> &'static str {
        match self {
            CollectionName::Registration => "registration",
            CollectionName::Report => "report",
            CollectionName::FlaggedPhoto => "flaggedPhoto",
            other => other.as_str(),
        }
    }
}

impl FromStr for CollectionName {
    type Err = StorageError;

    /// Accepts both the table name and the logical name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CollectionName::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.logical_name() == s)
            .ok_or_else(|| StorageError::InvalidCollection {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Field-equality filter. A document matches when every listed field is
/// present and equal to the given value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter(BTreeMap<String, Value>);

impl Filter {
    /// The empty filter: matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality constraint.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Filter matching exactly the fields of `doc`.
    ///
    /// This is the dedup key of [`EvidenceStore::write_once`].
    pub fn from_document(doc: &Document) -> Self {
        Filter(doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Whether `doc` satisfies every constraint.
    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(k, v)| doc.get(k) == Some(v))
    }
}

// ---------------------------------------------------------------------------
// EvidenceStore
// ---------------------------------------------------------------------------

/// Evidence collection store.
///
/// Guarantees:
/// - `read` returns matching documents in write order.
/// - `write_once(c, doc)` inserts `doc` only when `read(c, doc)` is empty.
///   The dedup key is the full document content, so the same record
///   submitted twice is stored once. Two concurrent writers may both pass
///   the existence check; no locking is implied.
/// - `clear` removes every document of one collection.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Return all documents in `collection` matching `filter`.
    async fn read(&self, collection: CollectionName, filter: &Filter)
        -> StorageResult<Vec<Document>>;

    /// Insert `record` unless an identical document already exists.
    async fn write_once(&self, collection: CollectionName, record: Document) -> StorageResult<()>;

    /// Delete every document in `collection`.
    async fn clear(&self, collection: CollectionName) -> StorageResult<()>;
}
