//! Reference index for the document gateway.
//!
//! A ref is a dated pointer from a logical id to an object hash:
//! `(namespace, logical_id, date) -> object`. Refs are the human-readable
//! entry points into the content-addressed object store, and the input the
//! manifest builder snapshots.
//!
//! # Architecture
//!
//! - A new ref is written for every publication; earlier refs for the same
//!   logical id remain in place.
//! - The **current** ref of a logical id is the one with the
//!   lexicographically greatest date string.
//! - Refs are write-once: rewriting a key with the same object is a no-op,
//!   with a different object it is a [`RefError::Conflict`].
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`RefKey`], [`Ref`], and the namespace/kind mapping
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`fs`] -- [`FsRefStore`], `refs/{namespace}/{logical_id}/{date}.json`
//! - [`memory`] -- In-memory [`InMemoryRefStore`] for tests

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use fs::FsRefStore;
pub use memory::InMemoryRefStore;
pub use traits::RefStore;
pub use types::{kind_for_namespace, namespace, namespace_for_kind, Ref, RefKey, RefRecord};
