//! Synchronous, string-keyed durable storage.
//!
//! A [`KeyValueStore`] behaves like a browser's local storage: string keys,
//! string values, every call completes before returning. [`FileStore`]
//! keeps all slots in one JSON object on disk; [`MemoryStore`] keeps them
//! in process. Both can enforce a byte quota over the stored values.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use log::warn;

use crate::io::atomic_write;

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A synchronous string-keyed store of string values
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` means the slot is empty.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a slot, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Clear a slot. Clearing an empty slot is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Total bytes the map would hold with `key` set to a value of `value_len` bytes.
fn size_with(items: &IndexMap<String, String>, key: &str, value_len: usize) -> usize {
    items
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum::<usize>()
        + key.len()
        + value_len
}

fn check_quota(
    items: &IndexMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = size_with(items, key, value.len());
    if needed > quota {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-process store; contents vanish with the value
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: IndexMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        MemoryStore {
            items: IndexMap::new(),
            quota: Some(bytes),
        }
    }

}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, value)?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.shift_remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// All slots in a single JSON object file.
///
/// The file is re-read on every call so that separate processes sharing
/// the file see each other's writes, and rewritten atomically on every
/// change. Reads of a corrupt file fail; the next write copies it to a new
/// `<file>.<timestamp>.bak` and starts from an empty object. If the copy
/// cannot be made the write is refused and the corrupt file stays put.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<IndexMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Current contents for a read-modify-write. A corrupt file is copied
    /// aside and treated as empty.
    fn read_for_write(&self) -> Result<IndexMap<String, String>, StorageError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f").to_string();
        self.read_for_write_stamped(&stamp)
    }

    fn read_for_write_stamped(&self, stamp: &str) -> Result<IndexMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupt { path, source }) => {
                let bak = back_up_corrupt(&path, stamp)?;
                warn!(
                    "event=store_reset module=kv status=recovered path={} backup={} error={}",
                    path.display(),
                    bak.display(),
                    source
                );
                Ok(IndexMap::new())
            }
            other => other,
        }
    }

    fn write_all(&self, items: &IndexMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(items)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StorageError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_for_write()?;
        check_quota(&items, self.quota, key, value)?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_for_write()?;
        if items.shift_remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

const MAX_BACKUP_NAMES: usize = 10;

/// `<file>.<stamp>.bak`, or `<file>.<stamp>-<n>.bak` for later attempts
fn backup_path(path: &Path, stamp: &str, attempt: usize) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    if attempt == 0 {
        name.push(format!(".{stamp}.bak"));
    } else {
        name.push(format!(".{stamp}-{attempt}.bak"));
    }
    path.with_file_name(name)
}

/// Copy `path` to a backup name that does not exist yet. Existing files
/// (older backups included) are never replaced.
fn back_up_corrupt(path: &Path, stamp: &str) -> Result<PathBuf, StorageError> {
    let bytes = fs::read(path).map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    for attempt in 0..MAX_BACKUP_NAMES {
        let bak = backup_path(path, stamp, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&bak) {
            Ok(mut file) => {
                file.write_all(&bytes)
                    .and_then(|()| file.sync_all())
                    .map_err(|e| StorageError::Io {
                        path: bak.clone(),
                        source: e,
                    })?;
                return Ok(bak);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(StorageError::Io { path: bak, source: e }),
        }
    }
    Err(StorageError::Io {
        path: backup_path(path, stamp, 0),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free backup name"),
    })
}
