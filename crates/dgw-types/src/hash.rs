use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Textual prefix of every object hash.
pub const HASH_PREFIX: &str = "sha256:";

/// Number of hex characters in a SHA-256 digest.
const HEX_LEN: usize = 64;

/// Content address of a stored document.
///
/// An `ObjectHash` is the SHA-256 digest of a document's canonical bytes. Its
/// textual form is `sha256:` followed by 64 lowercase hex characters; that is
/// the only form accepted by [`ObjectHash::parse`] and the only form ever
/// written to disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectHash([u8; 32]);

impl ObjectHash {
    /// Create an `ObjectHash` from a pre-computed digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// Parse the `sha256:<64 lowercase hex>` form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let hex_part = s
            .strip_prefix(HASH_PREFIX)
            .ok_or_else(|| TypeError::MissingPrefix(s.to_string()))?;
        if hex_part.len() != HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HEX_LEN,
                actual: hex_part.len(),
            });
        }
        // Uppercase digits would give one digest two spellings.
        if !hex_part
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(TypeError::InvalidHex(hex_part.to_string()));
        }
        let bytes = hex::decode(hex_part).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded digest without the `sha256:` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Directory shard for this hash: the first two hex characters.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HASH_PREFIX}{}", self.to_hex())
    }
}

impl FromStr for ObjectHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectHash {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ObjectHash> for String {
    fn from(hash: ObjectHash) -> Self {
        hash.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "sha256:1dc3d0e4809ec1c49d3ad5c524dadabbb5f80f9d7eb1053e3b5a0c71687f11a6";

    #[test]
    fn parse_display_roundtrip() {
        let hash = ObjectHash::parse(SAMPLE).unwrap();
        assert_eq!(hash.to_string(), SAMPLE);
    }

    #[test]
    fn missing_prefix_rejected() {
        let err = ObjectHash::parse(&SAMPLE[7..]).unwrap_err();
        assert!(matches!(err, TypeError::MissingPrefix(_)));
    }

    #[test]
    fn short_digest_rejected() {
        let err = ObjectHash::parse("sha256:deadbeef").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 64,
                actual: 8
            }
        );
    }

    #[test]
    fn uppercase_digest_rejected() {
        let upper = format!("sha256:{}", SAMPLE[7..].to_uppercase());
        assert!(matches!(
            ObjectHash::parse(&upper).unwrap_err(),
            TypeError::InvalidHex(_)
        ));
    }

    #[test]
    fn shard_is_first_two_hex_chars() {
        let hash = ObjectHash::parse(SAMPLE).unwrap();
        assert_eq!(hash.shard(), "1d");
        assert_eq!(hash.short_hex(), "1dc3d0e4");
    }

    #[test]
    fn serde_uses_prefixed_string() {
        let hash = ObjectHash::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let parsed: ObjectHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result: Result<ObjectHash, _> = serde_json::from_str("\"sha256:xyz\"");
        assert!(result.is_err());
    }
}
