//! File-based audit storage backend.
//!
//! One JSON file per record with a one-level fan-out on the id prefix:
//! `{root}/records/{id[0..2]}/{id}.json`.  The chain head lives in
//! `{root}/LAST_ID`.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use chainlog_contracts::{
    error::{StoreError, StoreResult},
    record::AuditRecord,
};
use chainlog_core::traits::AuditStorage;

const RECORDS_DIR: &str = "records";
const LAST_ID_FILE: &str = "LAST_ID";

/// File-based audit store.
///
/// Writes are atomic and durable: data goes to a temporary file which is
/// synced and then renamed into place, and the parent directory is synced
/// after the rename.  A crash never leaves a half-written record or head.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(RECORDS_DIR))?;
        debug!(root = %root.display(), "opened file audit storage");
        Ok(Self { root })
    }

    /// Path of the file holding record `id`, or `None` if `id` cannot name
    /// a record (anything but ASCII alphanumerics could escape the root).
    fn record_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        let prefix = &id[..id.len().min(2)];
        Some(
            self.root
                .join(RECORDS_DIR)
                .join(prefix)
                .join(format!("{id}.json")),
        )
    }

    fn last_id_path(&self) -> PathBuf {
        self.root.join(LAST_ID_FILE)
    }
}

fn invalid_id(id: &str) -> StoreError {
    StoreError::Backend(format!("invalid record id '{id}'"))
}

/// Write `data` to `path` through a synced temp file and a rename.
fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Backend(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(parent)?;

    // Unique per call, so writers sharing a directory never clobber each
    // other's temp file.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    sync_dir(parent)?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}

impl AuditStorage for FileStorage {
    fn get(&self, id: &str) -> StoreResult<Option<AuditRecord>> {
        let Some(path) = self.record_path(id) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Serialization(format!("record {}: {}", path.display(), e))
                })?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(&self, record: &AuditRecord) -> StoreResult<()> {
        let path = self.record_path(&record.id).ok_or_else(|| invalid_id(&record.id))?;
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        write_atomic(&path, &bytes)?;
        debug!(id = %record.id, path = %path.display(), "stored audit record to file");
        Ok(())
    }

    fn del(&self, id: &str) -> StoreResult<()> {
        let Some(path) = self.record_path(id) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id = %id, "deleted audit record file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn get_last_id(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.last_id_path()) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn set_last_id(&self, id: &str) -> StoreResult<()> {
        if self.record_path(id).is_none() {
            return Err(invalid_id(id));
        }
        write_atomic(&self.last_id_path(), id.as_bytes())
    }
}
