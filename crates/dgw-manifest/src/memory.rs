use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::manifest::Manifest;
use crate::traits::ManifestStore;

/// In-memory manifest store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryManifestStore {
    manifests: RwLock<BTreeMap<(String, String), Manifest>>,
}

impl InMemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestStore for InMemoryManifestStore {
    fn read(&self, dataset: &str, manifest_id: &str) -> Result<Option<Manifest>> {
        let map = self.manifests.read().expect("lock poisoned");
        Ok(map
            .get(&(dataset.to_string(), manifest_id.to_string()))
            .cloned())
    }

    fn create(&self, manifest: &Manifest) -> Result<bool> {
        manifest.validate_names()?;
        let mut map = self.manifests.write().expect("lock poisoned");
        let key = (manifest.dataset.clone(), manifest.manifest_id.clone());
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, manifest.clone());
        Ok(true)
    }

    fn list(&self, dataset: &str) -> Result<Vec<String>> {
        let map = self.manifests.read().expect("lock poisoned");
        Ok(map
            .keys()
            .filter(|(d, _)| d == dataset)
            .map(|(_, id)| id.clone())
            .collect())
    }
}
