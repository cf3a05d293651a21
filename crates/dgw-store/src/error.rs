use std::path::PathBuf;

use dgw_crypto::CommitmentError;
use dgw_types::{ObjectHash, TypeError};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectHash),

    /// A hash string or document failed validation.
    #[error(transparent)]
    Invalid(#[from] TypeError),

    /// The document could not be committed.
    #[error("cannot commit document: {0}")]
    Commitment(#[from] CommitmentError),

    /// A stored file exists but cannot be decoded.
    #[error("corrupt object file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
