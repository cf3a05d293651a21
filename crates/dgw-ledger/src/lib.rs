//! Audit ledger for the document gateway.
//!
//! Every state-changing or access-sensitive operation appends one
//! [`AuditEntry`] to the ledger: a single JSON object per line carrying a
//! timestamp, the acting subject, an `event` name, and event-specific
//! fields.
//!
//! ```text
//! {"ts":"2024-03-01T00:00:00Z","sub":"user:a","event":"channels.promote","dataset":"core",...}
//! ```
//!
//! # Design Rules
//!
//! 1. Append-only: entries are never rewritten or removed.
//! 2. One entry is one `write` of one complete line, made under a lock, so
//!    concurrent appends never interleave.
//! 3. Entries appear in completion order.

pub mod entry;
pub mod error;
pub mod memory;
pub mod ndjson;
pub mod traits;

pub use entry::{AuditEntry, AuditEvent};
pub use error::{LedgerError, Result};
pub use memory::InMemoryLedger;
pub use ndjson::{NdjsonLedger, LEDGER_FILE};
pub use traits::{AuditReader, AuditWriter, Ledger};
