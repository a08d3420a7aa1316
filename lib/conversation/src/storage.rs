//! Durable key-value storage backing the conversation store.
//!
//! Values are strings. Each `set` is atomic on its own; there is no
//! transaction spanning several keys.

use crate::error::StorageError;
use rootcause::Report;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Key holding the JSON-encoded conversation collection.
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Key holding the identifier of the selected conversation.
pub const ACTIVE_CONVERSATION_KEY: &str = "active-conversation";

/// Trait for string-valued durable storage.
pub trait KeyValueStorage: Send + Sync {
    /// Reads a key, returning `None` if it was never written or was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>>;

    /// Writes a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>>;

    /// Removes a key. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the removal.
    fn remove(&self, key: &str) -> Result<(), Report<StorageError>>;
}

/// Process-local storage, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Report<StorageError>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// File-backed storage keeping one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Report<StorageError>> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::Unavailable {
            location: root.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(root = %root.display(), "opened file storage");
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable {
                location: self.root.display().to_string(),
                reason: format!("invalid key '{key}'"),
            });
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("tmp");
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        fs::write(&tmp_path, value).map_err(write_failed)?;
        fs::rename(&tmp_path, &path).map_err(write_failed)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Report<StorageError>> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::RemoveFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(CONVERSATIONS_KEY).unwrap(), None);

        storage.set(CONVERSATIONS_KEY, "[]").unwrap();
        assert_eq!(storage.get(CONVERSATIONS_KEY).unwrap().as_deref(), Some("[]"));

        storage.remove(CONVERSATIONS_KEY).unwrap();
        assert_eq!(storage.get(CONVERSATIONS_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set(ACTIVE_CONVERSATION_KEY, "conv_1").unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(ACTIVE_CONVERSATION_KEY).unwrap().as_deref(),
            Some("conv_1")
        );
    }

    #[test]
    fn file_storage_overwrites_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set(CONVERSATIONS_KEY, "first").unwrap();
        storage.set(CONVERSATIONS_KEY, "second").unwrap();

        assert_eq!(storage.get(CONVERSATIONS_KEY).unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("conversations.tmp").exists());
    }

    #[test]
    fn file_storage_remove_absent_key_succeeds() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.remove(ACTIVE_CONVERSATION_KEY).unwrap();
        assert_eq!(storage.get(ACTIVE_CONVERSATION_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_creates_nested_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("data");
        let storage = FileStorage::open(&root).unwrap();

        storage.set(CONVERSATIONS_KEY, "[]").unwrap();
        assert!(root.join(CONVERSATIONS_KEY).exists());
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("").is_err());
    }
}
