//! Durable key-value storage seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store persists its bearer token here so a reload can resume the
//! session, and sweeps the session-scoped namespace on logout. Browsers back
//! this with `localStorage`, native shells with a JSON file, tests with
//! [`MemoryStorage`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::{DEFAULT_SESSION_SCOPE_PREFIX, DEFAULT_TOKEN_KEY};

/// Errors produced by durable storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing medium failed (file IO, quota, ...).
    #[error("storage io failed: {0}")]
    Io(String),

    /// Persisted contents could not be decoded.
    #[error("storage contents corrupt: {0}")]
    Corrupt(String),

    /// No storage is reachable in this runtime (e.g. private browsing).
    #[error("storage unavailable")]
    Unavailable,
}

/// Client-side persistent key-value store surviving reloads.
pub trait DurableStorage {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Every key currently present.
    fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Key layout used by the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key the bearer token is persisted under.
    pub token_key: String,
    /// Prefix of per-session cached data swept on logout.
    pub session_scope_prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            session_scope_prefix: DEFAULT_SESSION_SCOPE_PREFIX.to_owned(),
        }
    }
}

impl StorageKeys {
    /// Build a key for per-user cached data inside the swept namespace,
    /// e.g. `session:u42:chat_history`.
    #[must_use]
    pub fn session_scoped_key(&self, user_id: &str, name: &str) -> String {
        format!("{}{user_id}:{name}", self.session_scope_prefix)
    }

    /// Whether `key` belongs to the session-scoped namespace.
    #[must_use]
    pub fn is_session_scoped(&self, key: &str) -> bool {
        !self.session_scope_prefix.is_empty() && key.starts_with(&self.session_scope_prefix)
    }
}

/// In-memory storage. Clones share the same map, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: Rc::new(RefCell::new(map)) }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
