use dgw_manifest::ManifestError;
use dgw_types::TypeError;

/// Errors from channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel not found: {dataset}/{channel}")]
    NotFound { dataset: String, channel: String },

    /// The promotion request is unusable as given.
    #[error("invalid promotion: {0}")]
    Invalid(String),

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The registry document cannot be decoded.
    #[error("corrupt channel registry: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
