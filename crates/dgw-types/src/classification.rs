use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensitivity tag from `envelope.privacy.classification`.
///
/// Unrecognized labels are kept verbatim in [`Classification::Other`] and are
/// treated like `internal` by the access policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
    Other(String),
}

impl Classification {
    /// Parse a label; never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "public" => Self::Public,
            "internal" => Self::Internal,
            "confidential" => Self::Confidential,
            "restricted" => Self::Restricted,
            other => Self::Other(other.to_string()),
        }
    }

    /// The textual label.
    pub fn label(&self) -> &str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
            Self::Other(label) => label,
        }
    }

    /// Returns `true` for the `restricted` classification.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Classification {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Classification> for String {
    fn from(c: Classification) -> Self {
        c.label().to_string()
    }
}
