//! Winner id remapping for destructive restores.
//!
//! A restore deletes every winner and re-inserts it, so the remote store
//! hands out fresh ids. Elite entries still carry the old ids; `IdMapping`
//! records `old -> new` as winners are re-inserted and rewrites each elite
//! entry's reference through it.

use std::collections::HashMap;

use crate::types::WinnerRef;

#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    pairs: HashMap<String, String>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from ordered `(old_id, new_id)` pairs. A repeated
    /// `old_id` maps to its last `new_id`.
    pub fn from_pairs<I, O, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (O, N)>,
        O: Into<String>,
        N: Into<String>,
    {
        let mut mapping = Self::new();
        for (old_id, new_id) in pairs {
            mapping.record(old_id, new_id);
        }
        mapping
    }

    pub fn record(&mut self, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.pairs.insert(old_id.into(), new_id.into());
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// New reference for `old`, or `None` when `old` is `None` or was never
    /// re-inserted.
    pub fn remap(&self, old: Option<&WinnerRef>) -> Option<WinnerRef> {
        old.and_then(|r| self.pairs.get(r.as_str()))
            .map(|new_id| WinnerRef::new(new_id.as_str()))
    }
}
