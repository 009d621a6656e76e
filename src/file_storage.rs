//! JSON-file backed [`DurableStorage`] for native shells (the CLI).
//!
//! The whole key space lives in one JSON object. Every write is a
//! read-modify-write of that file: the new contents go to a temp file beside
//! it, which is then renamed over the original, so readers see the old file or
//! the new one and never a partial write. On unix the file is owner-only
//! (`0600`); it holds a bearer token.
//!
//! A missing file reads as empty. A file that does not parse is reported as
//! `Corrupt` on reads, and the next write replaces it.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::storage::{DurableStorage, StorageError};

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(format!("{}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    /// Current contents for a write, and whether corrupt contents were
    /// dropped (the write must then replace the file).
    fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.load() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt(detail)) => {
                tracing::warn!(path = %self.path.display(), %detail, "replacing unreadable session file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| StorageError::Io(format!("{}: {e}", parent.display())))?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };
        let body = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let tmp_path = dir.join(self.temp_file_name());
        let written = write_private(&tmp_path, body.as_bytes()).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if tmp_path.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp_path) {
                    tracing::debug!(path = %tmp_path.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            return Err(StorageError::Io(format!("{}: {e}", self.path.display())));
        }
        Ok(())
    }

    fn temp_file_name(&self) -> String {
        let file_name = self.path.file_name().map_or_else(|| "session".into(), |n| n.to_string_lossy());
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!(".{file_name}.tmp.{}.{nanos}", std::process::id())
    }
}

/// Create `path` fresh (owner-only on unix), write `bytes` and flush to disk.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (mut entries, _) = self.load_for_write()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let (mut entries, repaired) = self.load_for_write()?;
        if entries.remove(key).is_some() || repaired {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.load()?.into_keys().collect())
    }
}

#[cfg(test)]
#[path = "file_storage_test.rs"]
mod tests;
