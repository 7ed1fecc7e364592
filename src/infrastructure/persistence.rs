//! String-keyed stores backing the item list.

use super::errors::{StorageError, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::debug;

/// A small key-value store of strings.
///
/// Implementations are moved onto the storage worker thread, hence `Send`.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Stores every key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Writes through a temp file in the same directory and renames it over
    /// the target, so a crash never leaves a half-written entry behind.
    fn atomic_write(&self, target: &Path, content: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(target).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        self.atomic_write(&path, value)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote entry");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    writes: usize,
    fail_writes: Option<String>,
}

/// In-memory store. Clones share the same entries, so a test can hand one
/// clone to the worker and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Makes every following `set` fail with `reason`; `None` restores writes.
    pub fn fail_writes(&self, reason: Option<&str>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = reason.map(str::to_string);
        }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.writes).unwrap_or(0)
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.entries.get(key).cloned())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(reason) = &inner.fail_writes {
            return Err(StorageError::Simulated(reason.clone()));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
