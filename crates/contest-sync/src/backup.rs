//! Backup documents: every collection in one JSON file.
//!
//! `losers` and `elite_entries` are optional so older exports that only
//! carried winners still restore. Restoring such an export keeps the current
//! losers but deletes every elite entry, because the winners they point at
//! are reissued under new ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BackupError, Result};
use crate::types::{EliteEntry, Loser, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub exported_at: DateTime<Utc>,
    pub winners: Vec<Winner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losers: Option<Vec<Loser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elite_entries: Option<Vec<EliteEntry>>,
}

impl Backup {
    pub fn new(
        winners: Vec<Winner>,
        losers: Option<Vec<Loser>>,
        elite_entries: Option<Vec<EliteEntry>>,
    ) -> Self {
        Self {
            exported_at: Utc::now(),
            winners,
            losers,
            elite_entries,
        }
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input).map_err(BackupError::Parse)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(BackupError::Serialize)?)
    }
}
