//! Gateway facade for the document gateway.
//!
//! [`Gateway`] wires the object store, ref index, manifest store, channel
//! registry, access gate and audit ledger into the operations a transport
//! exposes. It is transport-agnostic: callers verify a credential (see
//! [`auth`]) to obtain a [`Principal`], then call the gateway.
//!
//! ```no_run
//! use dgw_sdk::{Gateway, GatewayConfig, Principal, View};
//!
//! let gw = Gateway::open(&GatewayConfig::default()).unwrap();
//! let reader = Principal::new("user:alice", ["objects:read"]);
//! let resp = gw
//!     .get_object::<&str>(&reader, "sha256:...", Some(View::Full), &[])
//!     .unwrap();
//! println!("{}", resp.view);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod verify;

pub use auth::{bearer_token, Hs256Verifier, TokenVerifier};
pub use config::{AuthConfig, GatewayConfig, JWT_SECRET_ENV};
pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use gateway::{Gateway, ObjectResponse, Published};
pub use verify::{Defect, DefectKind, VerificationReport};

// Re-export key types
pub use dgw_channels::{ChannelState, PointerRecord, PromotionOutcome};
pub use dgw_ledger::{AuditEntry, AuditEvent};
pub use dgw_manifest::Manifest;
pub use dgw_policy::{ForbiddenReason, PolicyConfig};
pub use dgw_refs::Ref;
pub use dgw_types::{scopes, Document, ObjectHash, Principal, View};
