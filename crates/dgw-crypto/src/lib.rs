//! Content hashing for the document gateway.
//!
//! Provides deterministic JSON canonicalization, SHA-256 content hashing, and
//! the integrity commitment protocol that binds a document to the hash stored
//! in its own envelope.
//!
//! All hashing goes through `sha2`; there is no custom cryptography.

pub mod canonical;
pub mod commitment;
pub mod hasher;

pub use canonical::{canonicalize, write_canonical};
pub use commitment::{
    claimed_hash, commit, compute_commitment, verify_commitment, CommitmentError, Verification,
};
pub use hasher::ContentHasher;
