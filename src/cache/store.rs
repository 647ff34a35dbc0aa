//! Byte stores backing the caches
//!
//! A store maps path-like keys to raw byte payloads and reports each entry's
//! last-modified time. Freshness is derived from that timestamp alone; no
//! metadata is kept next to the payload.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;

/// Errors raised by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry exists under the key
    #[error("no entry for key '{0}'")]
    NotFound(String),

    /// The key would escape the store's namespace
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    /// Underlying I/O failure
    #[error("store I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(key: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(key.to_string())
        } else {
            Self::Io {
                key: key.to_string(),
                source,
            }
        }
    }
}

/// Persistence collaborator shared by the resource and response caches
///
/// Writes are full overwrites and set the entry's modification time to now.
/// Implementations are not expected to coordinate concurrent writers.
pub trait Store: Send + Sync {
    /// Whether an entry exists under `key`
    fn exists(&self, key: &str) -> bool;

    /// Last-modified time of the entry under `key`
    fn modified(&self, key: &str) -> Result<DateTime<Utc>, StoreError>;

    /// Reads the full payload under `key`
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Replaces the payload under `key`
    fn write(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// Rejects keys that are empty or could leave the flat namespace
fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Store keeping each entry as a file in one directory
#[derive(Debug, Clone)]
pub struct FsStore {
    /// Directory where entry files are stored
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the entry files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    /// Ensures the store directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }
}

impl Store for FsStore {
    fn exists(&self, key: &str) -> bool {
        self.path_for(key).map(|path| path.is_file()).unwrap_or(false)
    }

    fn modified(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        let path = self.path_for(key)?;
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| StoreError::io(key, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        fs::read(path).map_err(|e| StoreError::io(key, e))
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        self.ensure_dir().map_err(|e| StoreError::io(key, e))?;
        fs::write(path, data).map_err(|e| StoreError::io(key, e))
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-process store, useful for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Overrides the modification time of an existing entry
    ///
    /// Returns `false` if there is no entry under `key`.
    pub fn set_modified(&self, key: &str, modified: DateTime<Utc>) -> bool {
        match self.entries.write().get_mut(key) {
            Some(entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }
}

impl Store for MemoryStore {
    fn exists(&self, key: &str) -> bool {
        check_key(key).is_ok() && self.entries.read().contains_key(key)
    }

    fn modified(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        check_key(key)?;
        self.entries
            .read()
            .get(key)
            .map(|entry| entry.modified)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        check_key(key)?;
        self.entries
            .read()
            .get(key)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.write().insert(
            key.to_string(),
            MemoryEntry {
                data: data.to_vec(),
                modified: Utc::now(),
            },
        );
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }

    fn modified(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        (**self).modified(key)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, data)
    }
}
