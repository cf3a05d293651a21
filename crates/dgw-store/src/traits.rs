use dgw_crypto::{canonicalize, commit, verify_commitment};
use dgw_types::{Document, ObjectHash};

use crate::error::{StoreError, StoreResult};

/// A committed document ready to be persisted.
#[derive(Clone, Debug)]
pub struct Sealed {
    /// Hash written into `envelope.integrity.hash`.
    pub hash: ObjectHash,
    /// The committed document.
    pub document: Document,
    /// Canonical bytes of the committed document.
    pub bytes: Vec<u8>,
}

/// Run the commitment protocol on a copy of `document`.
pub fn seal(document: &Document) -> StoreResult<Sealed> {
    let mut value = document.clone().into_value();
    let hash = commit(&mut value)?;
    let bytes = canonicalize(&value);
    let document = Document::from_value(value)?;
    Ok(Sealed {
        hash,
        document,
        bytes,
    })
}

/// Recompute a document's commitment and compare it with its claimed hash.
///
/// Returns `false` for a missing or malformed claim as well as a mismatch.
pub fn verify_document(document: &Document) -> bool {
    verify_commitment(&document.clone().into_value())
        .map(|v| v.is_valid())
        .unwrap_or(false)
}

/// Content-addressed document store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same committed content always
///   maps to the same hash, so rewriting is a no-op.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
///
/// Backends only provide raw byte access; commitment and decoding are shared
/// default methods.
pub trait ObjectStore: Send + Sync {
    /// Read the stored bytes for `hash`, or `Ok(None)` if absent.
    fn read_raw(&self, hash: &ObjectHash) -> StoreResult<Option<Vec<u8>>>;

    /// Store `bytes` under `hash`. Idempotent.
    fn write_raw(&self, hash: &ObjectHash, bytes: &[u8]) -> StoreResult<()>;

    /// Check whether an object exists in the store.
    fn exists(&self, hash: &ObjectHash) -> StoreResult<bool>;

    /// All stored hashes in ascending order.
    fn list(&self) -> StoreResult<Vec<ObjectHash>>;

    /// Commit and store a document, returning its hash.
    fn put(&self, document: &Document) -> StoreResult<ObjectHash> {
        let sealed = seal(document)?;
        self.write_raw(&sealed.hash, &sealed.bytes)?;
        Ok(sealed.hash)
    }

    /// Fetch a document by hash.
    fn get(&self, hash: &ObjectHash) -> StoreResult<Document> {
        let bytes = self
            .read_raw(hash)?
            .ok_or(StoreError::NotFound(*hash))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: format!("objects/{}/{}.json", hash.shard(), hash.to_hex()).into(),
            reason: e.to_string(),
        })
    }

    /// Fetch a document by its textual hash.
    ///
    /// Malformed hashes are rejected with [`StoreError::Invalid`] before any
    /// I/O happens.
    fn get_str(&self, hash: &str) -> StoreResult<Document> {
        let hash = ObjectHash::parse(hash)?;
        self.get(&hash)
    }
}
