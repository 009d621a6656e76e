//! `localStorage`-backed durable storage for the session core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hydrate builds persist the bearer token and session-scoped drafts here so
//! a reload resumes the session. SSR builds have no browser storage; every
//! call reports `Unavailable` and the app falls back to `MemoryStorage`.

use gamehub_session::{DurableStorage, StorageError};

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    pub fn new() -> Self {
        Self
    }

    /// Whether `localStorage` is reachable (false on SSR and in some private
    /// browsing modes).
    pub fn is_available() -> bool {
        #[cfg(feature = "hydrate")]
        {
            local_storage().is_ok()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            false
        }
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

#[cfg(feature = "hydrate")]
fn js_error(err: &wasm_bindgen::JsValue) -> StorageError {
    StorageError::Io(format!("{err:?}"))
}

impl DurableStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).map_err(|e| js_error(&e))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.set_item(key, value).map_err(|e| js_error(&e))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.remove_item(key).map_err(|e| js_error(&e))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage()?;
            let len = storage.length().map_err(|e| js_error(&e))?;
            let mut keys = Vec::new();
            for idx in 0..len {
                if let Some(key) = storage.key(idx).map_err(|e| js_error(&e))? {
                    keys.push(key);
                }
            }
            Ok(keys)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(StorageError::Unavailable)
        }
    }
}
