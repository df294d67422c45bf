use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::StorageBackend;
use crate::error::Result;

/// In-memory backend for tests and throwaway sessions. Clones share one
/// map, so a test can keep a handle on the state while the store under
/// test owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total writes across all keys since creation.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    /// The raw stored string for `key`, bypassing the trait's `Result`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().values.get(key).cloned()
    }

    /// Pre-populates a key, for tests that start from existing state.
    pub fn preload(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .values
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().unwrap().values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
