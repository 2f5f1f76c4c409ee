use std::collections::HashMap;

use super::{KeyValueStore, StorageError, StorageResult};

/// In-memory store, optionally with a byte budget like a browser quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `bytes`.
    pub fn with_capacity_bytes(bytes: usize) -> Self {
        Self {
            values: HashMap::new(),
            capacity: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(capacity) = self.capacity {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > capacity {
                return Err(StorageError::QuotaExceeded(format!(
                    "{needed} bytes needed, {capacity} available"
                )));
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.values.remove(key);
        Ok(())
    }
}
