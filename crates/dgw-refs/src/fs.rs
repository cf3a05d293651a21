use std::io;
use std::path::{Path, PathBuf};

use dgw_store::atomic;
use dgw_types::validate_segment;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;
use crate::types::{Ref, RefKey, RefRecord};

/// Filesystem ref store rooted at `refs/` below the repository root.
///
/// Layout: `refs/{namespace}/{logical_id}/{date}.json`, each file holding a
/// [`RefRecord`].
#[derive(Clone, Debug)]
pub struct FsRefStore {
    root: PathBuf,
}

impl FsRefStore {
    /// Open (without creating) the ref index under a repository root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Absolute path of a ref file.
    pub fn path_for(&self, key: &RefKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn refs_dir(&self) -> PathBuf {
        self.root.join("refs")
    }

    fn read_record(&self, key: &RefKey) -> Result<Option<RefRecord>> {
        let bytes = match std::fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RefError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })
    }
}

/// Sorted names of the entries in `dir` accepted by `select`.
///
/// Names that are not valid ref key segments are skipped. A missing directory
/// lists as empty.
fn sorted_names(dir: &Path, select: impl Fn(&Path) -> Option<String>) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        match select(&entry?.path()) {
            Some(name) if validate_segment("ref segment", &name).is_ok() => names.push(name),
            _ => {}
        }
    }
    names.sort();
    Ok(names)
}

fn dir_name(path: &Path) -> Option<String> {
    if !path.is_dir() {
        return None;
    }
    path.file_name()?.to_str().map(str::to_string)
}

fn json_stem(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

impl RefStore for FsRefStore {
    fn read(&self, key: &RefKey) -> Result<Option<Ref>> {
        match self.read_record(key)? {
            Some(record) => record.resolve(key.clone()).map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, reference: &Ref) -> Result<bool> {
        let path = self.path_for(&reference.key);
        let mut bytes = serde_json::to_vec_pretty(&reference.record())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        bytes.push(b'\n');

        if atomic::write_new(&path, &bytes)? {
            debug!(key = %reference.key, object = %reference.object, "ref written");
            return Ok(true);
        }
        let existing = self
            .read(&reference.key)?
            .ok_or_else(|| RefError::NotFound(reference.key.clone()))?;
        if existing.object == reference.object {
            Ok(false)
        } else {
            Err(RefError::Conflict {
                key: reference.key.clone(),
                existing: existing.object,
                requested: reference.object,
            })
        }
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        sorted_names(&self.refs_dir(), dir_name)
    }

    fn logical_ids(&self, namespace: &str) -> Result<Vec<String>> {
        sorted_names(&self.refs_dir().join(namespace), dir_name)
    }

    fn dates(&self, namespace: &str, logical_id: &str) -> Result<Vec<String>> {
        sorted_names(&self.refs_dir().join(namespace).join(logical_id), json_stem)
    }
}
