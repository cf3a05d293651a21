//! Access policy for the document gateway.
//!
//! Every object read passes through the [`AccessGate`]: a fail-fast pipeline
//! of stages that decides whether a principal may read an object and, if so,
//! which [`View`](dgw_types::View) it receives.
//!
//! # Quick Start
//!
//! ```rust
//! use dgw_policy::{AccessGate, PolicyConfig};
//! use dgw_types::{scopes, Document, Principal, View};
//!
//! let gate = AccessGate::with_default_stages(PolicyConfig::default());
//! let reader = Principal::new("user:a", [scopes::OBJECTS_READ_REDACTED]);
//! let doc = Document::from_value(serde_json::json!({"body": {}})).unwrap();
//! let decision = gate.authorize(&reader, &doc, None).unwrap();
//! assert_eq!(decision.view, View::Redacted);
//! ```
//!
//! The default pipeline is Classification -> View/Scope -> Purpose.

pub mod config;
pub mod error;
pub mod gate;
pub mod redact;
pub mod stage;
pub mod stages;
pub mod view;

pub use config::PolicyConfig;
pub use error::{ForbiddenReason, PolicyError};
pub use gate::{AccessDecision, AccessGate};
pub use redact::{apply_view, project_fields, redact};
pub use stage::{AccessContext, AccessRequest, AccessStage, StageDecision, StageResult};
pub use stages::{ClassificationStage, PurposeStage, ScopeStage};
pub use view::{require_any_scope, require_scope, resolve_view};
