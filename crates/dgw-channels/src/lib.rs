//! Channel registry and promotion for the document gateway.
//!
//! A channel is a named, mutable pointer from `(dataset, channel)` to the
//! dataset's current manifest. Every promotion that changes the manifest id
//! pushes the previous pointer onto the channel's history.
//!
//! The registry is a single JSON document (`channels.json`):
//!
//! ```text
//! { "<dataset>": { "<channel>": { "current": {...}, "history": [...] } } }
//! ```
//!
//! Older registries stored a channel as a bare manifest id, or stored
//! `current` as a bare id. Those legacy forms are read as-is and normalized
//! into structured pointers tagged `origin: "legacy"` the first time the
//! channel is promoted.
//!
//! # Key Types
//!
//! - [`PointerRecord`] -- a structured pointer with etag and provenance
//! - [`ChannelEntry`] / [`ChannelState`] -- stored channel forms
//! - [`ChannelRegistry`] -- transactional registry storage
//! - [`Promoter`] -- resolves manifest references and promotes them

pub mod error;
pub mod etag;
pub mod fs;
pub mod memory;
pub mod pointer;
pub mod promote;
pub mod registry;

pub use error::{ChannelError, Result};
pub use etag::{etag_for, weak_etag};
pub use fs::FsChannelRegistry;
pub use memory::InMemoryChannelRegistry;
pub use pointer::{ChannelEntry, ChannelState, CurrentPointer, Origin, PointerRecord};
pub use promote::{apply_promotion, Promoter, PromotionOutcome};
pub use registry::{ChannelRegistry, RegistryDocument};
