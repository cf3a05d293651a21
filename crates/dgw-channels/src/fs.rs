use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use dgw_store::atomic;
use fs4::FileExt;
use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::registry::{ChannelRegistry, RegistryDocument};

/// Registry file name under the repository root.
pub const REGISTRY_FILE: &str = "channels.json";

/// Advisory lock file taken by writers next to the registry.
pub const LOCK_FILE: &str = "channels.json.lock";

/// Filesystem channel registry backed by one `channels.json` document.
///
/// Every writer holds the registry-wide lock across the whole
/// read-modify-write. The lock is a process-wide mutex keyed by the
/// registry's canonical path, so separate instances over the same root
/// serialize, plus an exclusive advisory lock on [`LOCK_FILE`] for writers
/// in other processes. The new document replaces the old one by atomic
/// rename. Readers never take the lock.
#[derive(Debug)]
pub struct FsChannelRegistry {
    root: PathBuf,
    path: PathBuf,
}

impl FsChannelRegistry {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            path: root.join(REGISTRY_FILE),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The in-process writer lock for the registry at `path`.
fn writer_lock(path: &Path) -> Arc<Mutex<()>> {
    static WRITERS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut writers = WRITERS
        .get_or_init(Default::default)
        .lock()
        .expect("lock poisoned");
    Arc::clone(writers.entry(path.to_path_buf()).or_default())
}

impl ChannelRegistry for FsChannelRegistry {
    fn load(&self) -> Result<RegistryDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(RegistryDocument::default())
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RegistryDocument::default());
        }
        serde_json::from_slice(&bytes).map_err(|e| ChannelError::Corrupt(e.to_string()))
    }

    fn transact(
        &self,
        update: &mut dyn FnMut(&mut RegistryDocument) -> Result<()>,
    ) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let key = fs::canonicalize(&self.root)?.join(REGISTRY_FILE);
        let writer = writer_lock(&key);
        let _guard = writer.lock().expect("lock poisoned");

        // Released when the handle is dropped at the end of the transaction.
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join(LOCK_FILE))?;
        FileExt::lock_exclusive(&lock_file)?;

        let mut doc = self.load()?;
        update(&mut doc)?;
        let mut bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| ChannelError::Corrupt(e.to_string()))?;
        bytes.push(b'\n');
        atomic::write_replace(&self.path, &bytes)?;
        debug!(path = %self.path.display(), datasets = doc.0.len(), "channel registry written");
        Ok(())
    }
}
