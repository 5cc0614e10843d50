//! Remote store contract: the authoritative, possibly unreachable backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::types::{Collection, ContestFields, WinnerRef};

/// Row payload sent on insert. `winner_id` is only meaningful for
/// `elite_entries` and is always `None` for winners and losers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<WinnerRef>,
    #[serde(flatten)]
    pub fields: ContestFields,
}

/// Row as returned by the store, with the server-assigned id and the
/// server-side assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub row: RemoteRow,
}

/// User-implemented access to the remote store.
///
/// Every call may fail independently. The sync engine never retries; a
/// failure sends it down the local-cache path for that operation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a row and return it with its generated id.
    async fn insert(
        &self,
        collection: Collection,
        row: &RemoteRow,
    ) -> Result<StoredRow, RemoteError>;

    /// Every row of `collection`, ascending by creation.
    async fn select_all(&self, collection: Collection) -> Result<Vec<StoredRow>, RemoteError>;

    /// Delete one row. Deleting an id that does not exist is not an error.
    async fn delete_by_id(&self, collection: Collection, id: &str) -> Result<(), RemoteError>;

    /// Delete every row of `collection` unconditionally.
    async fn delete_all(&self, collection: Collection) -> Result<(), RemoteError>;
}
