use chrono::{DateTime, SecondsFormat, Utc};
use dgw_refs::{kind_for_namespace, RefStore};
use dgw_types::validate_segment;
use tracing::info;

use crate::error::Result;
use crate::manifest::{Manifest, ManifestEntry};
use crate::traits::ManifestStore;

/// Manifest id derived from a build time: `%Y%m%d-%H%M%S` in UTC.
pub fn default_manifest_id(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// Snapshots the ref index into manifests.
///
/// Only namespaces that map to a document kind take part (`entity` and
/// `activity`). For each logical id the ref with the greatest date is
/// selected; entries come out ordered by (namespace, logical id), so two
/// builds over the same ref index always yield the same entries.
pub struct ManifestBuilder<'a> {
    refs: &'a dyn RefStore,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(refs: &'a dyn RefStore) -> Self {
        Self { refs }
    }

    /// Current entries of the ref index.
    pub fn collect_entries(&self) -> Result<Vec<ManifestEntry>> {
        let mut entries = Vec::new();
        for ns in self.refs.namespaces()? {
            let Some(kind) = kind_for_namespace(&ns) else {
                continue;
            };
            for logical_id in self.refs.logical_ids(&ns)? {
                if let Some(current) = self.refs.latest(&ns, &logical_id)? {
                    entries.push(ManifestEntry {
                        kind: kind.to_string(),
                        logical_id,
                        date: current.key.date().to_string(),
                        object: current.object,
                    });
                }
            }
        }
        Ok(entries)
    }

    /// Build a sealed manifest without persisting it.
    pub fn build(&self, dataset: &str, manifest_id: &str, at: DateTime<Utc>) -> Result<Manifest> {
        validate_segment("dataset", dataset)?;
        validate_segment("manifest id", manifest_id)?;
        let created_at = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        Manifest::new(dataset, manifest_id, created_at, self.collect_entries()?).seal()
    }

    /// Build and persist a manifest.
    ///
    /// If the id is already taken, the stored manifest is returned when its
    /// entries equal the fresh build; otherwise the build fails with
    /// `Conflict` and nothing is written.
    pub fn build_into(
        &self,
        store: &dyn ManifestStore,
        dataset: &str,
        manifest_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Manifest> {
        let manifest = self.build(dataset, manifest_id, at)?;
        let stored = store.create_or_match(&manifest)?;
        info!(
            dataset,
            manifest_id,
            entries = stored.entries.len(),
            "manifest built"
        );
        Ok(stored)
    }
}
