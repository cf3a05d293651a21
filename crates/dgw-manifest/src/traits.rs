use tracing::debug;

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

/// Write-once manifest persistence.
///
/// Once a manifest is stored under `(dataset, manifest_id)` the stored
/// document never changes.
pub trait ManifestStore: Send + Sync {
    /// Read a manifest. Returns `Ok(None)` if absent.
    fn read(&self, dataset: &str, manifest_id: &str) -> Result<Option<Manifest>>;

    /// Store a manifest under its own dataset and id.
    ///
    /// Returns `Ok(false)` without writing if the id is already taken.
    fn create(&self, manifest: &Manifest) -> Result<bool>;

    /// Manifest ids stored for a dataset, ascending.
    fn list(&self, dataset: &str) -> Result<Vec<String>>;

    /// Read a manifest that must exist.
    fn get(&self, dataset: &str, manifest_id: &str) -> Result<Manifest> {
        self.read(dataset, manifest_id)?
            .ok_or_else(|| ManifestError::NotFound {
                dataset: dataset.to_string(),
                manifest_id: manifest_id.to_string(),
            })
    }

    /// Store `manifest` unless its id is taken; then return the stored one
    /// if its entries equal `manifest`'s, or fail with `Conflict`.
    fn create_or_match(&self, manifest: &Manifest) -> Result<Manifest> {
        manifest.validate_names()?;
        if self.create(manifest)? {
            return Ok(manifest.clone());
        }
        let existing = self.get(&manifest.dataset, &manifest.manifest_id)?;
        if existing.entries == manifest.entries {
            debug!(
                dataset = %manifest.dataset,
                manifest_id = %manifest.manifest_id,
                "manifest already stored with equal entries"
            );
            Ok(existing)
        } else {
            Err(ManifestError::Conflict {
                dataset: manifest.dataset.clone(),
                manifest_id: manifest.manifest_id.clone(),
            })
        }
    }
}
