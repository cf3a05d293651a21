use dgw_types::ObjectHash;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::write_canonical;

/// SHA-256 content hasher over canonical JSON.
///
/// Hashes are plain SHA-256 with no domain tag, so a stored document can be
/// checked with any SHA-256 tool against the canonical bytes.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash raw bytes.
    pub fn hash(data: &[u8]) -> ObjectHash {
        ObjectHash::from_digest(Sha256::digest(data).into())
    }

    /// Hash the canonical encoding of a JSON value.
    pub fn hash_value(value: &Value) -> ObjectHash {
        let mut hasher = Sha256::new();
        // `Sha256` implements `io::Write` infallibly.
        let _ = write_canonical(&mut hasher, value);
        ObjectHash::from_digest(hasher.finalize().into())
    }

    /// Verify that data produces the expected hash.
    pub fn verify(data: &[u8], expected: &ObjectHash) -> bool {
        Self::hash(data) == *expected
    }
}
