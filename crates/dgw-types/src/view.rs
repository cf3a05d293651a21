use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The projection of an object a caller receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// The stored document, unmodified.
    #[default]
    Full,
    /// Owner and outbound links removed.
    #[serde(alias = "llm_min")]
    Redacted,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Redacted => write!(f, "redacted"),
        }
    }
}

impl FromStr for View {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "redacted" | "llm_min" => Ok(Self::Redacted),
            other => Err(TypeError::UnknownView(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_legacy_name() {
        assert_eq!("llm_min".parse::<View>().unwrap(), View::Redacted);
        assert_eq!("redacted".parse::<View>().unwrap(), View::Redacted);
        assert_eq!("full".parse::<View>().unwrap(), View::Full);
        assert!("summary".parse::<View>().is_err());
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&View::Redacted).unwrap(), "\"redacted\"");
        let v: View = serde_json::from_str("\"llm_min\"").unwrap();
        assert_eq!(v, View::Redacted);
    }
}
