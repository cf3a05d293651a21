use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a request was forbidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The object is classified `restricted`.
    Restricted,
    /// The principal lacks a required scope.
    MissingScope,
    /// The declared purpose is not on the allow-list.
    PurposeDenied,
    /// A redacted-only principal asked for the full view.
    ViewEscalation,
}

impl ForbiddenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::MissingScope => "missing_scope",
            Self::PurposeDenied => "purpose_denied",
            Self::ViewEscalation => "view_escalation",
        }
    }
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from access policy evaluation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("forbidden ({reason}): {message}")]
    Forbidden {
        reason: ForbiddenReason,
        message: String,
    },
}

impl PolicyError {
    pub fn forbidden(reason: ForbiddenReason, message: impl Into<String>) -> Self {
        Self::Forbidden {
            reason,
            message: message.into(),
        }
    }

    pub fn reason(&self) -> ForbiddenReason {
        match self {
            Self::Forbidden { reason, .. } => *reason,
        }
    }
}
