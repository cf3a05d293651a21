use std::io;
use std::path::{Path, PathBuf};

use dgw_types::ObjectHash;
use tracing::debug;
use walkdir::WalkDir;

use crate::atomic;
use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// Directory under the repository root that holds objects.
pub const OBJECTS_DIR: &str = "objects";

/// Filesystem object store.
///
/// Objects live at `objects/{hex[0:2]}/{hex}.json` below the repository root,
/// holding the canonical bytes of the committed document.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    dir: PathBuf,
}

impl FsObjectStore {
    /// Open (without creating) the object store under a repository root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(OBJECTS_DIR),
        }
    }

    /// The `objects/` directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that holds `hash`.
    pub fn path_for(&self, hash: &ObjectHash) -> PathBuf {
        self.dir
            .join(hash.shard())
            .join(format!("{}.json", hash.to_hex()))
    }

    /// Recover the hash encoded in an object file path, if it is well-formed
    /// and sits in the matching shard directory.
    fn hash_from_path(path: &Path) -> Option<ObjectHash> {
        let stem = path.file_stem()?.to_str()?;
        if path.extension()? != "json" {
            return None;
        }
        let hash = ObjectHash::parse(&format!("{}{stem}", dgw_types::HASH_PREFIX)).ok()?;
        let shard = path.parent()?.file_name()?.to_str()?;
        (shard == hash.shard()).then_some(hash)
    }
}

impl ObjectStore for FsObjectStore {
    fn read_raw(&self, hash: &ObjectHash) -> StoreResult<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(hash)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_raw(&self, hash: &ObjectHash, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(hash);
        let created = atomic::write_new(&path, bytes)?;
        debug!(hash = %hash, created, bytes = bytes.len(), "object stored");
        Ok(())
    }

    fn exists(&self, hash: &ObjectHash) -> StoreResult<bool> {
        Ok(self.path_for(hash).is_file())
    }

    fn list(&self) -> StoreResult<Vec<ObjectHash>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut hashes = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(hash) = Self::hash_from_path(entry.path()) {
                hashes.push(hash);
            }
        }
        hashes.sort();
        Ok(hashes)
    }
}
