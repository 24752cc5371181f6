//! Key/value persistence behind the options store
//!
//! The browser build uses `localStorage`; tests and non-browser hosts use
//! `MemoryStorage`.

use std::collections::HashMap;
use thiserror::Error;

/// Storage failures (only writes can fail; a missing key is not an error)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    /// No storage backend is reachable (no window, storage disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write (quota, private mode)
    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    /// The value could not be encoded
    #[error("Failed to serialize value: {0}")]
    Serialize(String),
}

/// Minimal get/set contract of the persistence layer
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value, as if a previous session had saved it
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn from_window() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no global window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        // A throwing getItem (e.g. blocked storage) counts as "nothing saved"
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

/// Storage picked at startup: `localStorage` when reachable, else memory
pub enum SessionStorage {
    Browser(BrowserStorage),
    Memory(MemoryStorage),
}

impl SessionStorage {
    pub fn detect() -> Self {
        match BrowserStorage::from_window() {
            Ok(storage) => SessionStorage::Browser(storage),
            Err(e) => {
                log::warn!("{}; saved styles will not outlive this page", e);
                SessionStorage::Memory(MemoryStorage::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, SessionStorage::Browser(_))
    }
}

impl KeyValueStore for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            SessionStorage::Browser(storage) => storage.get(key),
            SessionStorage::Memory(storage) => storage.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            SessionStorage::Browser(storage) => storage.set(key, value),
            SessionStorage::Memory(storage) => storage.set(key, value),
        }
    }
}
