use std::collections::HashMap;
use parking_lot::RwLock;

use crate::collaborators::KeyValueStore;
use crate::errors::StoreError;

// @module: In-memory key/value store

/// Key/value store that lives for the duration of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    // @field: Stored values
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
