use dgw_channels::ChannelError;
use dgw_ledger::LedgerError;
use dgw_manifest::ManifestError;
use dgw_policy::{ForbiddenReason, PolicyError};
use dgw_refs::RefError;
use dgw_store::{SchemaError, StoreError};
use dgw_types::TypeError;
use thiserror::Error;

/// Transport-independent classification of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Integrity,
    ServerConfig,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Integrity => "integrity_error",
            Self::ServerConfig => "server_config",
            Self::Internal => "internal",
        }
    }

    /// HTTP status a transport should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Integrity | Self::ServerConfig | Self::Internal => 500,
        }
    }
}

/// Every error the gateway surfaces.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Forbidden(#[from] PolicyError),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("server configuration error: {0}")]
    ServerConfig(String),

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<TypeError> for GatewayError {
    fn from(e: TypeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) | Self::Schema(_) => ErrorKind::BadRequest,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::ServerConfig(_) => ErrorKind::ServerConfig,
            Self::Store(e) => store_kind(e),
            Self::Ref(e) => ref_kind(e),
            Self::Manifest(e) => manifest_kind(e),
            Self::Channel(e) => channel_kind(e),
            Self::Ledger(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    /// The policy reason, for `Forbidden` errors.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            Self::Forbidden(e) => Some(e.reason()),
            _ => None,
        }
    }
}

fn store_kind(e: &StoreError) -> ErrorKind {
    match e {
        StoreError::NotFound(_) => ErrorKind::NotFound,
        StoreError::Invalid(_) | StoreError::Commitment(_) => ErrorKind::BadRequest,
        StoreError::Corrupt { .. } | StoreError::Io(_) => ErrorKind::Internal,
    }
}

fn ref_kind(e: &RefError) -> ErrorKind {
    match e {
        RefError::NotFound(_) => ErrorKind::NotFound,
        RefError::InvalidName(_) => ErrorKind::BadRequest,
        RefError::Conflict { .. } => ErrorKind::Conflict,
        RefError::Malformed { .. } => ErrorKind::Integrity,
        RefError::Corrupt { .. } | RefError::Io(_) => ErrorKind::Internal,
    }
}

fn manifest_kind(e: &ManifestError) -> ErrorKind {
    match e {
        ManifestError::NotFound { .. } => ErrorKind::NotFound,
        ManifestError::Conflict { .. } => ErrorKind::Conflict,
        ManifestError::Invalid(_)
        | ManifestError::InvalidName(_)
        | ManifestError::Commitment(_) => ErrorKind::BadRequest,
        ManifestError::Refs(inner) => ref_kind(inner),
        ManifestError::Corrupt { .. } | ManifestError::Io(_) => ErrorKind::Internal,
    }
}

fn channel_kind(e: &ChannelError) -> ErrorKind {
    match e {
        ChannelError::NotFound { .. } => ErrorKind::NotFound,
        ChannelError::Invalid(_) | ChannelError::InvalidName(_) => ErrorKind::BadRequest,
        ChannelError::Manifest(inner) => manifest_kind(inner),
        ChannelError::Corrupt(_) | ChannelError::Io(_) => ErrorKind::Internal,
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
