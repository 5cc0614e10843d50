use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::CacheError;

use super::traits::CacheBackend;

/// Process-local cache. Contents vanish with the process; useful for tests
/// and for hosts that persist elsewhere.
#[derive(Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
