//! Global user directory management and storage.
//!
//! The directory is the cross-session registry of every registered user,
//! persisted under its own storage key so it survives session resets. It is
//! append-only: users are never mutated or deleted once registered.
//!
//! Persisted as a plain JSON array, the directory keeps two in-memory
//! indexes, one by phone and one by case-folded nickname. The indexes are
//! rebuilt on load and maintained on insert, so lookups and the uniqueness
//! checks are O(1) instead of linear scans.

use crate::error::Result;
use crate::storage::{keys, Storage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name, unique case-insensitively across the directory
    pub nickname: String,

    /// Phone number, the identity key
    pub phone: String,

    /// When this user registered
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record stamped with the current time.
    pub fn new(nickname: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            phone: phone.into(),
            registered_at: Utc::now(),
        }
    }
}

/// The global registry of registered users.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<User>,
    /// phone -> index into `users`
    by_phone: HashMap<String, usize>,
    /// lowercased nickname -> index into `users`
    by_nickname: HashMap<String, usize>,
}

impl UserDirectory {
    /// Load the directory from storage.
    ///
    /// A corrupt directory blob is treated as empty (and logged); the blob is
    /// left in place until the next successful registration overwrites it.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        let users = match storage.get(keys::ALL_USERS)? {
            Some(contents) => match serde_json::from_str::<Vec<User>>(&contents) {
                Ok(users) => users,
                Err(e) => {
                    tracing::warn!("corrupt user directory, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut directory = Self::default();
        for user in users {
            directory.index(user);
        }
        Ok(directory)
    }

    /// Save the directory to storage.
    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        let contents = serde_json::to_string(&self.users)?;
        storage.set(keys::ALL_USERS, &contents)
    }

    /// Append a user, updating both indexes. Skips duplicate phones.
    fn index(&mut self, user: User) -> bool {
        if self.by_phone.contains_key(&user.phone) {
            return false;
        }
        let idx = self.users.len();
        self.by_phone.insert(user.phone.clone(), idx);
        self.by_nickname.insert(user.nickname.to_lowercase(), idx);
        self.users.push(user);
        true
    }

    /// Insert a user into the directory.
    ///
    /// Returns false (a no-op) if a user with the same phone is already
    /// registered. Callers that need to distinguish phone and nickname
    /// conflicts should check [`contains_phone`](Self::contains_phone) and
    /// [`find_by_nickname`](Self::find_by_nickname) first.
    pub fn insert(&mut self, user: User) -> bool {
        self.index(user)
    }

    /// Whether a user with this phone is registered.
    pub fn contains_phone(&self, phone: &str) -> bool {
        self.by_phone.contains_key(phone)
    }

    /// Find a user by phone.
    pub fn find_by_phone(&self, phone: &str) -> Option<&User> {
        self.by_phone.get(phone).map(|&i| &self.users[i])
    }

    /// Find a user by nickname, case-insensitively.
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&User> {
        self.by_nickname
            .get(&nickname.to_lowercase())
            .map(|&i| &self.users[i])
    }

    /// Find a user matching both nickname (case-insensitive) and phone.
    ///
    /// Both must match the same record.
    pub fn find(&self, nickname: &str, phone: &str) -> Option<&User> {
        self.find_by_phone(phone)
            .filter(|u| u.nickname.to_lowercase() == nickname.to_lowercase())
    }

    /// Get all registered users.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Get the number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
