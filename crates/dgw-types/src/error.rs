use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("hash must start with sha256: (got {0:?})")]
    MissingPrefix(String),

    #[error("invalid hex digest: {0}")]
    InvalidHex(String),

    #[error("invalid digest length: expected {expected} hex chars, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),

    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("invalid {what} {name:?}: {reason}")]
    InvalidName {
        what: &'static str,
        name: String,
        reason: String,
    },
}
