use std::sync::Mutex;

use crate::error::Result;
use crate::registry::{ChannelRegistry, RegistryDocument};

/// In-memory channel registry for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryChannelRegistry {
    doc: Mutex<RegistryDocument>,
}

impl InMemoryChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document, e.g. one holding legacy entries.
    pub fn with_document(doc: RegistryDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

impl ChannelRegistry for InMemoryChannelRegistry {
    fn load(&self) -> Result<RegistryDocument> {
        Ok(self.doc.lock().expect("lock poisoned").clone())
    }

    fn transact(
        &self,
        update: &mut dyn FnMut(&mut RegistryDocument) -> Result<()>,
    ) -> Result<()> {
        let mut guard = self.doc.lock().expect("lock poisoned");
        let mut next = guard.clone();
        update(&mut next)?;
        *guard = next;
        Ok(())
    }
}
