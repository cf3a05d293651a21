use dgw_crypto::CommitmentError;
use dgw_refs::RefError;
use dgw_types::TypeError;

/// Errors from manifest operations.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest not found: {dataset}/{manifest_id}")]
    NotFound {
        dataset: String,
        manifest_id: String,
    },

    /// A different manifest is already stored under this id.
    #[error("manifest {dataset}/{manifest_id} already exists with different entries")]
    Conflict {
        dataset: String,
        manifest_id: String,
    },

    /// The caller supplied something that is not a usable manifest.
    #[error("invalid manifest: {0}")]
    Invalid(String),

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    Refs(#[from] RefError),

    #[error("cannot commit manifest: {0}")]
    Commitment(#[from] CommitmentError),

    /// A stored manifest file cannot be decoded.
    #[error("corrupt manifest {dataset}/{manifest_id}: {reason}")]
    Corrupt {
        dataset: String,
        manifest_id: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
