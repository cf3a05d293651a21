use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::entry::AuditEntry;
use crate::error::{LedgerError, Result};
use crate::traits::{AuditReader, AuditWriter};

/// File name of the ledger under a repository root.
pub const LEDGER_FILE: &str = "ledger.ndjson";

/// Newline-delimited JSON ledger file.
///
/// The file is opened in append mode. Each entry is serialized up front and
/// handed to the OS as one buffer while the writer mutex is held, so a line
/// is never split by another append from this process. On read, lines that
/// do not parse (a torn final line after a crash, or foreign content) are
/// logged and skipped.
pub struct NdjsonLedger {
    path: PathBuf,
    writer: Mutex<File>,
}

impl NdjsonLedger {
    /// Open (or create) the ledger file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
        })
    }

    /// Open the ledger of the repository rooted at `root`.
    pub fn in_root(root: &Path) -> Result<Self> {
        Self::open(&root.join(LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditWriter for NdjsonLedger {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line =
            serde_json::to_vec(entry).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let mut file = self.writer.lock().expect("lock poisoned");
        file.write_all(&line)?;
        file.flush()?;

        debug!(event = entry.event.name(), len = line.len(), "ledger append");
        Ok(())
    }
}

impl AuditReader for NdjsonLedger {
    fn read_all(&self) -> Result<Vec<AuditEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "unreadable ledger line; skipping");
                }
            }
        }
        Ok(entries)
    }
}
