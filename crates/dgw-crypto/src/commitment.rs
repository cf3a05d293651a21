//! The integrity commitment protocol.
//!
//! A committed document carries its own hash at `envelope.integrity.hash`.
//! The hash is computed over the canonical form of the document with that
//! one field set to `null`, then written into the field:
//!
//! ```text
//! envelope.integrity.hash = null
//! h = sha256(canonicalize(doc))
//! envelope.integrity.hash = "sha256:<h>"
//! ```
//!
//! Verification repeats the computation on a copy and compares exactly.

use dgw_types::ObjectHash;
use serde_json::{Map, Value};

use crate::hasher::ContentHasher;

const ENVELOPE: &str = "envelope";
const INTEGRITY: &str = "integrity";
const HASH: &str = "hash";

/// Errors from committing or verifying a document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("{0} must be a JSON object")]
    NotAnObjectAt(&'static str),
}

/// Outcome of recomputing a document's commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The claimed hash matches the recomputed hash.
    Valid(ObjectHash),
    /// The claimed hash differs from the recomputed hash.
    Mismatch { claimed: String, computed: ObjectHash },
    /// No well-formed hash is claimed at `envelope.integrity.hash`.
    Missing,
}

impl Verification {
    /// Returns `true` if the commitment holds.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Compute the commitment hash of `doc` without modifying it.
pub fn compute_commitment(doc: &Value) -> Result<ObjectHash, CommitmentError> {
    let mut scratch = doc.clone();
    *integrity_slot(&mut scratch)? = Value::Null;
    Ok(ContentHasher::hash_value(&scratch))
}

/// Commit `doc` in place: compute its hash and store it in the envelope.
///
/// Missing `envelope` or `envelope.integrity` objects are created.
pub fn commit(doc: &mut Value) -> Result<ObjectHash, CommitmentError> {
    let slot = integrity_slot(doc)?;
    *slot = Value::Null;
    let hash = ContentHasher::hash_value(doc);
    *integrity_slot(doc)? = Value::String(hash.to_string());
    Ok(hash)
}

/// Recompute the commitment of `doc` and compare it with the claimed hash.
pub fn verify_commitment(doc: &Value) -> Result<Verification, CommitmentError> {
    let claimed = match claimed_hash(doc) {
        Some(claimed) => claimed.to_string(),
        None => return Ok(Verification::Missing),
    };
    if ObjectHash::parse(&claimed).is_err() {
        return Ok(Verification::Missing);
    }
    let computed = compute_commitment(doc)?;
    if computed.to_string() == claimed {
        Ok(Verification::Valid(computed))
    } else {
        Ok(Verification::Mismatch { claimed, computed })
    }
}

/// The hash claimed at `envelope.integrity.hash`, if it is a string.
pub fn claimed_hash(doc: &Value) -> Option<&str> {
    doc.get(ENVELOPE)?.get(INTEGRITY)?.get(HASH)?.as_str()
}

/// Mutable access to `envelope.integrity.hash`, creating parents as needed.
fn integrity_slot(doc: &mut Value) -> Result<&mut Value, CommitmentError> {
    let root = doc.as_object_mut().ok_or(CommitmentError::NotAnObject)?;
    let envelope = child_object(root, ENVELOPE, "envelope")?;
    let integrity = child_object(envelope, INTEGRITY, "envelope.integrity")?;
    Ok(integrity.entry(HASH).or_insert(Value::Null))
}

fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    path: &'static str,
) -> Result<&'a mut Map<String, Value>, CommitmentError> {
    parent
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(CommitmentError::NotAnObjectAt(path))
}
