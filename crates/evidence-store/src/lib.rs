//! Evidence-Store: SurrealDB Backend for exam proctoring evidence
//!
//! This crate provides the persistence layer for the proctoring system.
//! Every raw observation recorded during an exam session (screenshots,
//! periodic photos, blur and out-of-frame events, conversation snippets,
//! registrations) and every cached exam report lives in one of a fixed set
//! of named collections.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: equality queries, idempotent writes, bulk reset.
//!
//! ## Key Components
//!
//! - `EvidenceStore`: the adapter contract (`read`, `write_once`, `clear`)
//! - `CollectionName`: the closed set of recognized collections
//! - `MemoryEvidenceStore`: in-memory fake for tests
//! - `SurrealEvidenceStore`: SurrealDB implementation

mod config;
mod error;
pub mod fakes;
mod migrations;
pub mod storage_traits;
pub mod surreal_store;

pub use config::StoreConfig;
pub use error::StorageError;
pub use storage_traits::{
    document_from, CollectionName, Document, EvidenceStore, Filter, StorageResult,
};
pub use surreal_store::SurrealEvidenceStore;
