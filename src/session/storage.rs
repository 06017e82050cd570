//! Persisted session record
//!
//! The record is two string slots, the token and the `{id, email}` user
//! JSON, kept in a key/value store under configurable keys (`authToken` and
//! `user` by default). Backends write and clear both slots in one operation
//! so a reader never observes one without the other.

use crate::models::auth::AuthError;
use crate::settings::{StorageBackend, StorageSettings};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Keys of the two persisted slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub token_key: String,
    pub user_key: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token_key: "authToken".to_string(),
            user_key: "user".to_string(),
        }
    }
}

impl From<&StorageSettings> for StorageKeys {
    fn from(settings: &StorageSettings) -> Self {
        Self {
            token_key: settings.token_key.clone(),
            user_key: settings.user_key.clone(),
        }
    }
}

/// Raw slot contents as read from a backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSlots {
    pub token: Option<String>,
    pub user: Option<String>,
}

impl PersistedSlots {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Key/value persistence for the session record
pub trait SessionStorage: Send {
    /// Read both slots
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be read
    fn load(&self) -> Result<PersistedSlots, AuthError>;

    /// Write both slots in one operation
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be written; neither
    /// slot changes in that case
    fn save(&mut self, token: &str, user: &str) -> Result<(), AuthError>;

    /// Remove both slots in one operation
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be written
    fn clear(&mut self) -> Result<(), AuthError>;
}

/// Build the backend selected in settings
#[must_use]
pub fn storage_from_settings(settings: &StorageSettings) -> Box<dyn SessionStorage> {
    let keys = StorageKeys::from(settings);
    match settings.backend {
        StorageBackend::Memory => Box::new(MemoryStorage::with_keys(keys)),
        StorageBackend::File => Box::new(FileStorage::with_keys(&settings.path, keys)),
    }
}

// =============================================================================
// Memory backend
// =============================================================================

/// In-process key/value store
///
/// Clones share the same entries, so a caller can keep a handle to inspect
/// or tamper with raw slots while the session manager owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    keys: StorageKeys,
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keys(keys: StorageKeys) -> Self {
        Self {
            keys,
            entries: Arc::default(),
        }
    }

    /// Read a raw entry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Write a raw entry, bypassing the paired-slot rule
    pub fn set_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    /// Remove a raw entry, bypassing the paired-slot rule
    pub fn remove_raw(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AuthError> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<PersistedSlots, AuthError> {
        let entries = self.entries()?;
        Ok(PersistedSlots {
            token: entries.get(&self.keys.token_key).cloned(),
            user: entries.get(&self.keys.user_key).cloned(),
        })
    }

    fn save(&mut self, token: &str, user: &str) -> Result<(), AuthError> {
        let mut entries = self.entries()?;
        entries.insert(self.keys.token_key.clone(), token.to_string());
        entries.insert(self.keys.user_key.clone(), user.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), AuthError> {
        let mut entries = self.entries()?;
        entries.remove(&self.keys.token_key);
        entries.remove(&self.keys.user_key);
        Ok(())
    }
}

// =============================================================================
// File backend
// =============================================================================

/// JSON object on disk holding the slots
///
/// Each write goes to a sibling temp file that is then renamed over the
/// record, so both slots change together. Unrelated keys in the object are
/// preserved.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    keys: StorageKeys,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_keys(path, StorageKeys::default())
    }

    pub fn with_keys(path: impl AsRef<Path>, keys: StorageKeys) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            keys,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, AuthError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(AuthError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(AuthError::Storage(format!(
                "{} is not valid JSON: {e}",
                self.path.display()
            ))),
        }
    }

    /// Entries to rewrite; an unreadable record is replaced rather than kept
    fn entries_for_write(&self) -> Map<String, Value> {
        self.read_entries().unwrap_or_else(|e| {
            warn!("Replacing unreadable session record: {e}");
            Map::new()
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote session record to {}", self.path.display());
        Ok(())
    }

    /// Sibling of the record with `.tmp` appended, never the record itself
    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn slot(entries: &Map<String, Value>, key: &str) -> Option<String> {
        entries.get(key).and_then(Value::as_str).map(ToString::to_string)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<PersistedSlots, AuthError> {
        let entries = self.read_entries()?;
        Ok(PersistedSlots {
            token: Self::slot(&entries, &self.keys.token_key),
            user: Self::slot(&entries, &self.keys.user_key),
        })
    }

    fn save(&mut self, token: &str, user: &str) -> Result<(), AuthError> {
        let mut entries = self.entries_for_write();
        entries.insert(self.keys.token_key.clone(), Value::String(token.to_string()));
        entries.insert(self.keys.user_key.clone(), Value::String(user.to_string()));
        self.write_entries(&entries)
    }

    fn clear(&mut self) -> Result<(), AuthError> {
        if !self.path.exists() {
            return Ok(());
        }

        let mut entries = self.entries_for_write();
        entries.remove(&self.keys.token_key);
        entries.remove(&self.keys.user_key);
        self.write_entries(&entries)
    }
}
