use std::io;
use std::path::{Path, PathBuf};

use dgw_store::atomic;
use dgw_types::validate_segment;
use tracing::info;

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;
use crate::traits::ManifestStore;

/// Filesystem manifest store: `manifests/{dataset}/{manifest_id}.json`.
///
/// Files are pretty-printed JSON and created with a no-clobber rename, so
/// concurrent writers of the same id cannot overwrite each other.
#[derive(Clone, Debug)]
pub struct FsManifestStore {
    dir: PathBuf,
}

impl FsManifestStore {
    /// Open (without creating) the manifest store under a repository root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join("manifests"),
        }
    }

    pub fn path_for(&self, dataset: &str, manifest_id: &str) -> PathBuf {
        self.dir.join(dataset).join(format!("{manifest_id}.json"))
    }
}

impl ManifestStore for FsManifestStore {
    fn read(&self, dataset: &str, manifest_id: &str) -> Result<Option<Manifest>> {
        validate_segment("dataset", dataset)?;
        validate_segment("manifest id", manifest_id)?;
        let bytes = match std::fs::read(self.path_for(dataset, manifest_id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ManifestError::Corrupt {
                dataset: dataset.to_string(),
                manifest_id: manifest_id.to_string(),
                reason: e.to_string(),
            })
    }

    fn create(&self, manifest: &Manifest) -> Result<bool> {
        manifest.validate_names()?;
        let mut bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|e| ManifestError::Invalid(e.to_string()))?;
        bytes.push(b'\n');
        let path = self.path_for(&manifest.dataset, &manifest.manifest_id);
        let created = atomic::write_new(&path, &bytes)?;
        if created {
            info!(
                dataset = %manifest.dataset,
                manifest_id = %manifest.manifest_id,
                entries = manifest.entries.len(),
                "manifest written"
            );
        }
        Ok(created)
    }

    fn list(&self, dataset: &str) -> Result<Vec<String>> {
        validate_segment("dataset", dataset)?;
        let entries = match std::fs::read_dir(self.dir.join(dataset)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use dgw_types::ObjectHash;

    fn manifest(id: &str) -> Manifest {
        Manifest::new(
            "core",
            id,
            "2024-03-01T00:00:00Z",
            vec![ManifestEntry {
                kind: "EntityRecord".into(),
                logical_id: "e1".into(),
                date: "2024-03-01".into(),
                object: ObjectHash::from_digest([5; 32]),
            }],
        )
        .seal()
        .unwrap()
    }

    #[test]
    fn create_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path());
        let m = manifest("m1");
        assert!(store.create(&m).unwrap());
        assert!(dir.path().join("manifests/core/m1.json").is_file());

        let back = store.get("core", "m1").unwrap();
        assert_eq!(back, m);
        assert!(back.verify().unwrap().is_valid());
    }

    #[test]
    fn second_create_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path());
        store.create(&manifest("m1")).unwrap();
        let before = std::fs::read(store.path_for("core", "m1")).unwrap();

        let mut other = manifest("m1");
        other.entries.clear();
        assert!(!store.create(&other).unwrap());
        assert_eq!(std::fs::read(store.path_for("core", "m1")).unwrap(), before);
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path());
        assert!(matches!(
            store.read("core", "../../etc/passwd"),
            Err(ManifestError::InvalidName(_))
        ));
    }

    #[test]
    fn list_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path());
        store.create(&manifest("m2")).unwrap();
        store.create(&manifest("m1")).unwrap();
        assert_eq!(store.list("core").unwrap(), vec!["m1", "m2"]);
        assert!(store.list("empty").unwrap().is_empty());
    }
}
