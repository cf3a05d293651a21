//! Foundation types for the document gateway.
//!
//! This crate provides the identity, access, and classification types used
//! throughout the gateway. Every other `dgw` crate depends on `dgw-types`.
//!
//! # Key Types
//!
//! - [`ObjectHash`] -- Content address of a stored document (`sha256:<hex>`)
//! - [`Principal`] -- Verified caller: subject, scopes, and optional purpose
//! - [`View`] -- Projection of an object a caller may receive (full or redacted)
//! - [`Document`] -- JSON object with the envelope / context / body layout
//! - [`Classification`] -- Sensitivity tag carried in an object's envelope

pub mod classification;
pub mod document;
pub mod error;
pub mod hash;
pub mod names;
pub mod principal;
pub mod view;

pub use classification::Classification;
pub use document::Document;
pub use error::TypeError;
pub use hash::{ObjectHash, HASH_PREFIX};
pub use names::validate_segment;
pub use principal::{scopes, Principal};
pub use view::View;
