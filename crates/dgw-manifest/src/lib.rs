//! Dataset manifests for the document gateway.
//!
//! A manifest is an immutable, identified snapshot of a dataset: the current
//! ref of every logical id in the ref index at build time, plus a flattened
//! list of the object hashes it references.
//!
//! # Key Types
//!
//! - [`Manifest`] -- the manifest document, with [`ManifestEntry`] rows
//! - [`ManifestRef`] -- a promotion target given by id or inline
//! - [`ManifestBuilder`] -- snapshots a [`RefStore`](dgw_refs::RefStore)
//! - [`ManifestStore`] -- write-once persistence, with filesystem and
//!   in-memory backends

pub mod builder;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod memory;
pub mod traits;

pub use builder::{default_manifest_id, ManifestBuilder};
pub use error::{ManifestError, Result};
pub use fs::FsManifestStore;
pub use manifest::{Manifest, ManifestEntry, ManifestRef, ObjectEntry};
pub use memory::InMemoryManifestStore;
pub use traits::ManifestStore;
