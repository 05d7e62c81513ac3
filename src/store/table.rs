//! MemStore implementation
//!
//! HashMap-based store with a single Mutex for concurrency.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::KvEngine;

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl KvEngine for MemStore {
    fn put(&self, key: String, value: String) -> Option<String> {
        self.data.lock().insert(key, value)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn delete(&self, key: &str) -> Option<String> {
        self.data.lock().remove(key)
    }
}
