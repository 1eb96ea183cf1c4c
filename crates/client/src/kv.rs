//! String key-value storage for client state that outlives a run.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::KvError;

const APP_NAME: &str = "quiz";

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `KvError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// # Errors
    ///
    /// Returns `KvError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `KvError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `KvError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, KvError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| KvError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The platform's local data directory for this app, or `.` if unknown.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(KvError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(KvError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let path = self.path_for(key)?;
        fs::write(&path, value).map_err(|source| KvError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved client state");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(KvError::Io { path, source }),
        }
    }
}
