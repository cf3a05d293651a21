use std::sync::Mutex;

use crate::entry::AuditEntry;
use crate::error::Result;
use crate::traits::{AuditReader, AuditWriter};

/// In-memory ledger for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditWriter for InMemoryLedger {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .push(entry.clone());
        Ok(())
    }
}

impl AuditReader for InMemoryLedger {
    fn read_all(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.entries.lock().expect("lock poisoned").clone())
    }
}
