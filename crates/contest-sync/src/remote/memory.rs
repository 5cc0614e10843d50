//! MemoryRemoteStore — an in-process `RemoteStore`.
//!
//! Assigns uuid ids and keeps rows in insertion order, which doubles as
//! creation order. Elite inserts enforce that a set `winner_id` names an
//! existing winner, like the foreign key on the hosted store; deleting a
//! winner leaves referencing elite rows alone.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::error::{RemoteError, RemoteErrorKind};
use crate::types::Collection;

use super::types::{RemoteRow, RemoteStore, StoredRow};

#[derive(Default)]
pub struct MemoryRemoteStore {
    rows: Mutex<HashMap<Collection, Vec<StoredRow>>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rows of `collection` in creation order.
    pub fn rows(&self, collection: Collection) -> Vec<StoredRow> {
        self.rows
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rows in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.rows.lock().get(&collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn insert(
        &self,
        collection: Collection,
        row: &RemoteRow,
    ) -> Result<StoredRow, RemoteError> {
        let mut rows = self.rows.lock();

        if collection == Collection::EliteEntries {
            if let Some(ref winner_id) = row.winner_id {
                let exists = rows
                    .get(&Collection::Winners)
                    .is_some_and(|winners| winners.iter().any(|w| w.id == winner_id.as_str()));
                if !exists {
                    return Err(RemoteError::with_kind(
                        format!("winner_id \"{winner_id}\" does not reference an existing winner"),
                        RemoteErrorKind::Rejected,
                    ));
                }
            }
        }

        let stored = StoredRow {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            row: RemoteRow {
                winner_id: match collection {
                    Collection::EliteEntries => row.winner_id.clone(),
                    _ => None,
                },
                fields: row.fields.clone(),
            },
        };
        rows.entry(collection).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn select_all(&self, collection: Collection) -> Result<Vec<StoredRow>, RemoteError> {
        Ok(self.rows(collection))
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        if let Some(rows) = self.rows.lock().get_mut(&collection) {
            rows.retain(|r| r.id != id);
        }
        Ok(())
    }

    async fn delete_all(&self, collection: Collection) -> Result<(), RemoteError> {
        self.rows.lock().remove(&collection);
        Ok(())
    }
}
