//! In-memory fake for the evidence store (testing only)
//!
//! `MemoryEvidenceStore` satisfies the `EvidenceStore` contract without any
//! external dependencies. Collections can be switched into an unavailable
//! state to exercise storage-fault paths.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory evidence store backed by a `HashMap<collection, Vec<document>>`.
///
/// Documents keep their insertion order.
#[derive(Debug, Default)]
pub struct MemoryEvidenceStore {
    collections: Mutex<HashMap<CollectionName, Vec<Document>>>,
    unavailable: Mutex<HashSet<CollectionName>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document unconditionally (test seeding; bypasses dedup).
    pub fn insert(&self, collection: CollectionName, doc: Document) {
        let mut collections = self.collections.lock().unwrap();
        collections.entry(collection).or_default().push(doc);
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: CollectionName) -> usize {
        let collections = self.collections.lock().unwrap();
        collections.get(&collection).map(Vec::len).unwrap_or(0)
    }

    /// Make every operation on `collection` fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, collection: CollectionName, unavailable: bool) {
        let mut set = self.unavailable.lock().unwrap();
        if unavailable {
            set.insert(collection);
        } else {
            set.remove(&collection);
        }
    }

    fn check_available(&self, collection: CollectionName) -> StorageResult<()> {
        if self.unavailable.lock().unwrap().contains(&collection) {
            return Err(StorageError::unavailable(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                format!("collection {collection} is unavailable"),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn read(
        &self,
        collection: CollectionName,
        filter: &Filter,
    ) -> StorageResult<Vec<Document>> {
        self.check_available(collection)?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn write_once(&self, collection: CollectionName, record: Document) -> StorageResult<()> {
        // Existence check and insert are separate steps, as in the real backend.
        let existing = self.read(collection, &Filter::from_document(&record)).await?;
        if !existing.is_empty() {
            return Ok(());
        }
        self.check_available(collection)?;
        self.insert(collection, record);
        Ok(())
    }

    async fn clear(&self, collection: CollectionName) -> StorageResult<()> {
        self.check_available(collection)?;
        let mut collections = self.collections.lock().unwrap();
        collections.remove(&collection);
        Ok(())
    }
}
