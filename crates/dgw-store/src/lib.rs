//! Content-addressed document storage for the document gateway.
//!
//! Every object is an immutable JSON [`Document`](dgw_types::Document) stored
//! under the SHA-256 hash of its committed canonical form. Storing an object
//! runs the integrity commitment protocol from `dgw-crypto`: the hash is
//! written into `envelope.integrity.hash` and the canonical bytes of the
//! final document are persisted.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] -- sharded `objects/{hex[0:2]}/{hex}.json` files
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written and never deleted by the gateway.
//! 2. Writes are idempotent: storing identical content twice is a no-op.
//! 3. Files are created through a temp file and an atomic rename.
//! 4. Reads do not re-verify integrity; [`verify_document`] is used by the
//!    repository checker instead.

pub mod atomic;
pub mod error;
pub mod fs;
pub mod memory;
pub mod schema;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use schema::{AcceptAll, RequiredFields, SchemaError, SchemaValidator};
pub use traits::{seal, verify_document, ObjectStore, Sealed};
