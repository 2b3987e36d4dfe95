//! Durable local snapshot store.
//!
//! Used to carry unsent state across page reloads: the delivery pipeline
//! writes a snapshot when retries are exhausted, and construction reads it
//! back once to seed the in-memory state. Storage is shared only within one
//! page context; concurrent contexts may race, which is accepted.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Durable key/value store for state snapshots.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// One JSON file per key under a base directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are config-controlled identifiers, not user input; still keep
        // them flat.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write to a sibling temp file first so a failed write never leaves
        // a truncated snapshot behind.
        let tmp = tmp_path(&path);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.as_os_str().to_owned();
    p.push(".tmp");
    PathBuf::from(p)
}

/// In-memory store for tests, with an optional byte quota per put.
#[derive(Default)]
pub struct MemoryStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Default::default(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn seed(&self, key: &str, bytes: Vec<u8>) {
        self.entries.borrow_mut().insert(key.to_string(), bytes);
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(cap) = self.quota {
            if bytes.len() > cap {
                return Err(StorageError::QuotaExceeded {
                    size: bytes.len(),
                    cap,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
