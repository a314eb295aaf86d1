//! Key-Value Stores for Learner Progress
//!
//! The tracker only needs string get/set. `FileStore` keeps every key in a
//! single JSON file under the user data directory; `MemoryStore` backs tests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::StorageError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// On-disk layout of the store file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// When the file was last written
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

fn read_store_file(path: &Path) -> Result<StoreFile, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(json) if json.trim().is_empty() => Ok(StoreFile::default()),
        Ok(json) => serde_json::from_str(&json).map_err(|e| StorageError::Corrupted {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
        Err(e) => Err(StorageError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Persistent store backed by one JSON file.
///
/// Each write re-reads the file, merges the one key and replaces the file
/// through a temp file in the same directory. Keys written by another
/// process sharing the file survive; the last write to a key wins.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let state = read_store_file(&path)?;
        debug!(
            "Opened progress store at {} ({} keys)",
            path.display(),
            state.entries.len()
        );
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreFile) -> Result<(), StorageError> {
        let write_err = |message: String| StorageError::Write {
            path: self.path.clone(),
            message,
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;

        let json = serde_json::to_string_pretty(state).map_err(|e| write_err(e.to_string()))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| write_err(e.error.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.state.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        let mut merged = read_store_file(&self.path)?;
        merged.entries.insert(key.to_string(), value.to_string());
        merged.updated_at = Some(Utc::now());
        self.persist(&merged)?;
        *state = merged;
        Ok(())
    }
}

/// Volatile store; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
