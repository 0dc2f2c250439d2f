//! Durable key-value storage
//!
//! The prediction history lives under a single key in a small embedded
//! key-value store, playing the role browser local storage plays for a web
//! page. [`SledStore`] is the on-disk backend; [`MemoryStore`] keeps data in
//! process and is used when nothing should touch the disk.

use crate::error::{NeuralensError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Minimal key-value interface used by the history store
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// On-disk store backed by `sled`
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use neuralens::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> neuralens::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("history.db"))?;
    /// store.set("greeting", b"hello")?;
    /// assert_eq!(store.get("greeting")?, Some(b"hello".to_vec()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NeuralensError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| NeuralensError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!(path = %path.display(), "Opened history database");

        Ok(Self { db, path })
    }

    /// Open the store at the default location in the user's data directory
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path()?)
    }

    /// Location of the database on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default database location: `<data dir>/history.db`
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "neuralens", "neuralens")
        .ok_or_else(|| NeuralensError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("history.db"))
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| NeuralensError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| NeuralensError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| NeuralensError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| NeuralensError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| NeuralensError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// In-process store; contents vanish with the value
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| NeuralensError::Storage("Memory store lock poisoned".to_string()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
