//! Error taxonomy for evidence aggregation.
//!
//! Three kinds of failure, each handled at a fixed boundary:
//! - `InvalidCollection` always reaches the caller.
//! - `StorageUnavailable` is absorbed by the materializer / cache controller
//!   and turns into "no report this pass".
//! - `PerceptionFault` is absorbed inside the signal evaluator that hit it
//!   and becomes a FAIL or ERROR verdict for that signal alone.

use evidence_store::StorageError;

/// Errors produced while aggregating evidence into reports.
#[derive(Debug, thiserror::Error)]
pub enum ProctorError {
    #[error("invalid collection: {0}")]
    InvalidCollection(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),

    #[error("perception fault: {0}")]
    PerceptionFault(String),
}

impl ProctorError {
    pub fn perception(msg: impl Into<String>) -> Self {
        ProctorError::PerceptionFault(msg.into())
    }

    /// Whether this error belongs to the storage-fault class.
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, ProctorError::StorageUnavailable(_))
    }
}

impl From<StorageError> for ProctorError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidCollection { name } => ProctorError::InvalidCollection(name),
            other => ProctorError::StorageUnavailable(other),
        }
    }
}

impl From<reqwest::Error> for ProctorError {
    fn from(err: reqwest::Error) -> Self {
        ProctorError::PerceptionFault(err.to_string())
    }
}

/// Result type for proctoring operations.
pub type Result<T> = std::result::Result<T, ProctorError>;
