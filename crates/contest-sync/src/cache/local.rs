//! LocalCache — typed snapshot access over a [`CacheBackend`].
//!
//! Each collection lives under `"{prefix}:{collection}"` as a JSON array of
//! records. Writes always replace the whole array.

use std::sync::Arc;

use crate::error::CacheError;
use crate::types::{Collection, Entry, Record};

use super::traits::CacheBackend;

/// Default key prefix for cache slots.
pub const DEFAULT_KEY_PREFIX: &str = "contest";

#[derive(Clone)]
pub struct LocalCache {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
}

impl LocalCache {
    pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// Slot key for `collection`.
    pub fn key(&self, collection: Collection) -> String {
        format!("{}:{}", self.prefix, collection.name())
    }

    /// Read the last snapshot of `collection`.
    ///
    /// `Ok(None)` means the slot was never written. Unparseable content is
    /// reported as [`CacheError::MalformedSnapshot`]; the caller decides
    /// whether to fail open.
    pub fn read<F: Entry>(
        &self,
        collection: Collection,
    ) -> Result<Option<Vec<Record<F>>>, CacheError> {
        let key = self.key(collection);
        let Some(payload) = self.backend.get(&key)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| CacheError::MalformedSnapshot {
                namespace: key,
                source,
            })
    }

    /// Overwrite the snapshot of `collection` with `records`.
    pub fn write<F: Entry>(
        &self,
        collection: Collection,
        records: &[Record<F>],
    ) -> Result<(), CacheError> {
        let key = self.key(collection);
        let payload = serde_json::to_string(records).map_err(|source| CacheError::Encode {
            namespace: key.clone(),
            source,
        })?;
        self.backend.set(&key, &payload)
    }
}
