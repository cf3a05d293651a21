//! In-memory reference store for testing and ephemeral use.

use std::collections::BTreeMap;
use std::sync::RwLock;

use dgw_types::ObjectHash;

use crate::error::{RefError, Result};
use crate::traits::RefStore;
use crate::types::{Ref, RefKey};

/// An in-memory implementation of [`RefStore`].
///
/// Refs live in a `BTreeMap` behind a `RwLock`, which keeps every listing in
/// order for free. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<RefKey, ObjectHash>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn read(&self, key: &RefKey) -> Result<Option<Ref>> {
        let refs = self.refs.read().expect("lock poisoned");
        Ok(refs.get(key).map(|object| Ref::new(key.clone(), *object)))
    }

    fn write(&self, reference: &Ref) -> Result<bool> {
        let mut refs = self.refs.write().expect("lock poisoned");
        match refs.get(&reference.key) {
            Some(existing) if *existing == reference.object => Ok(false),
            Some(existing) => Err(RefError::Conflict {
                key: reference.key.clone(),
                existing: *existing,
                requested: reference.object,
            }),
            None => {
                refs.insert(reference.key.clone(), reference.object);
                Ok(true)
            }
        }
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let refs = self.refs.read().expect("lock poisoned");
        let mut names: Vec<String> = refs.keys().map(|k| k.namespace().to_string()).collect();
        names.dedup();
        Ok(names)
    }

    fn logical_ids(&self, namespace: &str) -> Result<Vec<String>> {
        let refs = self.refs.read().expect("lock poisoned");
        let mut ids: Vec<String> = refs
            .keys()
            .filter(|k| k.namespace() == namespace)
            .map(|k| k.logical_id().to_string())
            .collect();
        ids.dedup();
        Ok(ids)
    }

    fn dates(&self, namespace: &str, logical_id: &str) -> Result<Vec<String>> {
        let refs = self.refs.read().expect("lock poisoned");
        Ok(refs
            .keys()
            .filter(|k| k.namespace() == namespace && k.logical_id() == logical_id)
            .map(|k| k.date().to_string())
            .collect())
    }
}
