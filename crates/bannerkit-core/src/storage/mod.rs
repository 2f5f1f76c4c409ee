//! Durable key-value storage for the editor session.
//!
//! The session stores two JSON documents: the current composition and the
//! template list. Any backend that can hold strings under a key works; the
//! browser build uses `localStorage`.

mod directory;
mod memory;
mod state;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use state::{load_composition, parse_composition, save_composition};

use thiserror::Error;

/// Error types for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be mapped onto the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend is out of space
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The value could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String values under string keys.
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` if the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
