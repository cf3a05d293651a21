use crate::entry::{AuditEntry, AuditEvent};
use crate::error::Result;

/// Append boundary of the ledger.
pub trait AuditWriter: Send + Sync {
    /// Append one entry as a single complete line.
    fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Stamp `event` with the current time and append it.
    fn record(&self, sub: Option<&str>, event: AuditEvent) -> Result<()> {
        self.append(&AuditEntry::now(sub, event))
    }
}

/// Read boundary of the ledger.
pub trait AuditReader: Send + Sync {
    /// Every readable entry in append order.
    fn read_all(&self) -> Result<Vec<AuditEntry>>;

    /// The last `n` entries in append order.
    fn tail(&self, n: usize) -> Result<Vec<AuditEntry>> {
        let mut all = self.read_all()?;
        let skip = all.len().saturating_sub(n);
        Ok(all.split_off(skip))
    }
}

/// A ledger that can be both appended to and read.
pub trait Ledger: AuditWriter + AuditReader {}

impl<T: AuditWriter + AuditReader> Ledger for T {}
