//! Error types for evidence-store

use thiserror::Error;

/// Errors that can occur in the evidence persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Collection name is not one of the recognized collections
    #[error("invalid collection name: {name}")]
    InvalidCollection { name: String },

    /// Underlying store could not be reached or rejected the operation
    #[error("storage unavailable: {source}")]
    Unavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored document or a filter does not have the expected shape
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl StorageError {
    /// Wrap a backend fault, keeping the original error as the source.
    pub fn unavailable<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Unavailable {
            source: Box::new(err),
        }
    }
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::unavailable(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Malformed(err.to_string())
    }
}
