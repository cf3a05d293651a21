/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
