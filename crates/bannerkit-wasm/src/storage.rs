//! `localStorage` backend for the editor session.

use bannerkit_core::storage::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::console_warn;

/// A [`KeyValueStore`] over the browser's `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The current window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Fails outside a window context and when storage is disabled, e.g.
    /// by privacy settings.
    pub fn from_window() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Backend("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(to_storage_error)?
            .ok_or_else(|| StorageError::Backend("localStorage is unavailable".to_string()))?;
        Ok(Self::new(storage))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage.get_item(key).map_err(to_storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(|e| {
            let err = to_storage_error(e);
            console_warn(&format!("Failed to write {}: {}", key, err));
            err
        })
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.storage.remove_item(key).map_err(to_storage_error)
    }
}

/// Map a thrown DOM exception onto a storage error.
fn to_storage_error(error: JsValue) -> StorageError {
    let field = |name: &str| {
        js_sys::Reflect::get(&error, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_string())
    };
    let message = field("message")
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{:?}", error));
    match field("name").as_deref() {
        Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => {
            StorageError::QuotaExceeded(message)
        }
        _ => StorageError::Backend(message),
    }
}
