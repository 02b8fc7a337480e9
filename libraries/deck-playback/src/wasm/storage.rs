//! `window.localStorage` key-value store

use super::describe;
use crate::{error::StorageError, persistence::KeyValueStore};
use tracing::debug;
use web_sys::Storage;

/// Store backed by `localStorage`
///
/// Private browsing and sandboxed frames can deny access; the store then
/// reports [`StorageError::Unavailable`] on every call.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| match w.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                debug!(error = %describe(&e), "localStorage unavailable");
                None
            }
        });
        Self { storage }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            message: describe(&e),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: describe(&e),
        })
    }
}
