//! Key-value storage abstraction for session and directory state.
//!
//! All persisted state is JSON under four logical keys:
//! - `beamchat_current_user`: the logged-in [`User`](crate::directory::User)
//! - `beamchat_contacts`: the session's contact list
//! - `beamchat_messages`: the per-contact message threads
//! - `beamchat_all_users`: the global user directory
//!
//! Every mutating operation overwrites the affected keys wholesale; there is
//! no incremental patching.

use crate::error::{Error, Result};
use crate::platform;
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage keys for the four logical namespaces.
pub mod keys {
    /// The currently logged-in user record.
    pub const CURRENT_USER: &str = "beamchat_current_user";
    /// The session's contact list.
    pub const CONTACTS: &str = "beamchat_contacts";
    /// The per-contact message threads.
    pub const MESSAGES: &str = "beamchat_messages";
    /// The global user directory, shared across sessions.
    pub const ALL_USERS: &str = "beamchat_all_users";
}

/// Pluggable key-value store holding JSON documents.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Sled-backed persistent storage.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// Open or create a database at the given path.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("failed to create data directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Storage(format!("failed to open chat database: {}", e)))?;

        Ok(Self { db })
    }

    /// Open the database at the default platform location.
    pub fn open_default() -> Result<Self> {
        Self::open(&platform::chat_db_path())
    }

    /// Open an in-memory database for testing.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config
            .open()
            .map_err(|e| Error::Storage(format!("failed to open in-memory database: {}", e)))?;
        Ok(Self { db })
    }

    /// Flush the database to disk.
    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }
}

impl Storage for SledStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|e| Error::Storage(format!("non-utf8 value under {}: {}", key, e)))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(Error::Storage(format!("failed to read {}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", key, e)))?;
        Ok(())
    }
}

/// HashMap-backed storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        assert!(storage.get(keys::CURRENT_USER).unwrap().is_none());

        storage.set(keys::CURRENT_USER, r#"{"nickname":"alice"}"#).unwrap();
        assert_eq!(
            storage.get(keys::CURRENT_USER).unwrap().unwrap(),
            r#"{"nickname":"alice"}"#
        );

        // Full overwrite
        storage.set(keys::CURRENT_USER, "null").unwrap();
        assert_eq!(storage.get(keys::CURRENT_USER).unwrap().unwrap(), "null");
    }

    #[test]
    fn test_sled_storage_roundtrip() {
        let storage = SledStorage::open_in_memory().unwrap();

        assert!(storage.get(keys::CONTACTS).unwrap().is_none());

        storage.set(keys::CONTACTS, "[]").unwrap();
        assert_eq!(storage.get(keys::CONTACTS).unwrap().unwrap(), "[]");

        storage.set(keys::CONTACTS, r#"[{"phone":"5551234567"}]"#).unwrap();
        assert_eq!(
            storage.get(keys::CONTACTS).unwrap().unwrap(),
            r#"[{"phone":"5551234567"}]"#
        );
    }

    #[test]
    fn test_keys_are_distinct() {
        let storage = MemoryStorage::new();
        storage.set(keys::CONTACTS, "[]").unwrap();
        storage.set(keys::MESSAGES, "{}").unwrap();

        assert_eq!(storage.get(keys::CONTACTS).unwrap().unwrap(), "[]");
        assert_eq!(storage.get(keys::MESSAGES).unwrap().unwrap(), "{}");
        assert!(storage.get(keys::ALL_USERS).unwrap().is_none());
    }
}
