//! Error types for reference operations.

use dgw_types::{ObjectHash, TypeError};
use thiserror::Error;

use crate::types::RefKey;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("ref not found: {0}")]
    NotFound(RefKey),

    /// A namespace, logical id or date is not a valid path segment.
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    /// The key already points at a different object.
    #[error("ref {key} already points at {existing}, refusing {requested}")]
    Conflict {
        key: RefKey,
        existing: ObjectHash,
        requested: ObjectHash,
    },

    /// The ref file parses but its `object` is not a valid hash.
    #[error("ref {key} holds a malformed object hash: {reason}")]
    Malformed { key: RefKey, reason: String },

    /// The ref file cannot be decoded.
    #[error("corrupt ref {key}: {reason}")]
    Corrupt { key: RefKey, reason: String },

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
