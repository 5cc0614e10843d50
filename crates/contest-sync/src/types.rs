//! Record model shared by the cache, remote, sync, and selection layers.
//!
//! A record is either `Pending` (written locally, never acknowledged by the
//! remote store) or `Persisted` (carries the remote-assigned id). Both forms
//! serialize to the same flat JSON object; `id` is simply omitted while
//! pending.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::remote::{RemoteRow, StoredRow};

/// Upper bound on `chat_ids` per record.
pub const MAX_CHAT_IDS: usize = 10;

// ============================================================================
// Collection
// ============================================================================

/// The three record collections, named the same on the remote store and in
/// the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Winners,
    Losers,
    EliteEntries,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Winners,
        Collection::Losers,
        Collection::EliteEntries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Winners => "winners",
            Collection::Losers => "losers",
            Collection::EliteEntries => "elite_entries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Candidate input
// ============================================================================

/// A guide eligible for the contest. Owned by the caller; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateGuide {
    pub guide_id: String,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub supervisor: String,
}

// ============================================================================
// Field sets
// ============================================================================

/// Field set shared by winners, losers, and elite entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestFields {
    pub guide_id: String,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub supervisor: String,
    /// Client-generated creation instant. Never changes after creation.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub chat_ids: Vec<String>,
}

impl ContestFields {
    /// Build a record for `guide` stamped at `timestamp`.
    pub fn new(
        guide: &CandidateGuide,
        timestamp: DateTime<Utc>,
        chat_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            guide_id: guide.guide_id.clone(),
            name: guide.name.clone(),
            department: guide.department.clone(),
            supervisor: guide.supervisor.clone(),
            timestamp,
            chat_ids: sanitize_chat_ids(chat_ids, MAX_CHAT_IDS),
        }
    }

    /// Build a record for `guide` stamped with the current time.
    pub fn from_candidate(
        guide: &CandidateGuide,
        chat_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::new(guide, Utc::now(), chat_ids)
    }
}

/// Drop blank entries and cap the list at `limit`.
///
/// Entries are kept verbatim; whitespace only decides whether an entry is
/// blank.
pub fn sanitize_chat_ids(ids: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    ids.into_iter()
        .filter(|id| !id.trim().is_empty())
        .take(limit)
        .collect()
}

/// Weak reference from an elite entry to a winner record.
///
/// Only a relation: the winner may be deleted or re-issued under a new id
/// without the entry being told. Use [`WinnerRef::resolve`] to look the
/// winner up in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinnerRef(String);

impl WinnerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find the referenced winner in `winners`, if it is still there.
    pub fn resolve<'a>(&self, winners: &'a [Winner]) -> Option<&'a Winner> {
        winners.iter().find(|w| w.id() == Some(self.as_str()))
    }
}

impl fmt::Display for WinnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Elite-tier promotion of a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliteFields {
    #[serde(default)]
    pub winner_id: Option<WinnerRef>,
    #[serde(flatten)]
    pub entry: ContestFields,
}

impl EliteFields {
    /// Promote `winner` to the elite tier, stamped with the current time.
    ///
    /// A pending winner has no id yet, so the entry is created unlinked.
    pub fn promote(winner: &Winner, chat_ids: impl IntoIterator<Item = String>) -> Self {
        let source = winner.fields();
        Self {
            winner_id: winner.id().map(WinnerRef::new),
            entry: ContestFields {
                guide_id: source.guide_id.clone(),
                name: source.name.clone(),
                department: source.department.clone(),
                supervisor: source.supervisor.clone(),
                timestamp: Utc::now(),
                chat_ids: sanitize_chat_ids(chat_ids, MAX_CHAT_IDS),
            },
        }
    }
}

// ============================================================================
// Entry
// ============================================================================

/// A field set that can be stored in a collection and sent to the remote
/// store.
pub trait Entry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn contest(&self) -> &ContestFields;
    fn contest_mut(&mut self) -> &mut ContestFields;
    fn to_row(&self) -> RemoteRow;
    fn from_row(row: RemoteRow) -> Self;
}

impl Entry for ContestFields {
    fn contest(&self) -> &ContestFields {
        self
    }

    fn contest_mut(&mut self) -> &mut ContestFields {
        self
    }

    fn to_row(&self) -> RemoteRow {
        RemoteRow {
            winner_id: None,
            fields: self.clone(),
        }
    }

    fn from_row(row: RemoteRow) -> Self {
        row.fields
    }
}

impl Entry for EliteFields {
    fn contest(&self) -> &ContestFields {
        &self.entry
    }

    fn contest_mut(&mut self) -> &mut ContestFields {
        &mut self.entry
    }

    fn to_row(&self) -> RemoteRow {
        RemoteRow {
            winner_id: self.winner_id.clone(),
            fields: self.entry.clone(),
        }
    }

    fn from_row(row: RemoteRow) -> Self {
        Self {
            winner_id: row.winner_id,
            entry: row.fields,
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// A record in one of the collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "RecordRepr<F>",
    into = "RecordRepr<F>",
    bound(
        serialize = "F: Serialize + Clone",
        deserialize = "F: DeserializeOwned"
    )
)]
pub enum Record<F> {
    /// Written locally while the remote store was unreachable.
    Pending(F),
    /// Acknowledged by the remote store under `id`.
    Persisted { id: String, fields: F },
}

pub type Winner = Record<ContestFields>;
pub type Loser = Record<ContestFields>;
pub type EliteEntry = Record<EliteFields>;

impl<F> Record<F> {
    pub fn persisted(id: impl Into<String>, fields: F) -> Self {
        Record::Persisted {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Record::Pending(_) => None,
            Record::Persisted { id, .. } => Some(id),
        }
    }

    pub fn fields(&self) -> &F {
        match self {
            Record::Pending(fields) | Record::Persisted { fields, .. } => fields,
        }
    }

    pub fn into_fields(self) -> F {
        match self {
            Record::Pending(fields) | Record::Persisted { fields, .. } => fields,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Record::Persisted { .. })
    }
}

impl<F: Entry> Record<F> {
    pub fn from_stored(row: StoredRow) -> Self {
        Record::Persisted {
            id: row.id,
            fields: F::from_row(row.row),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.fields().contest().timestamp
    }

    pub fn name(&self) -> &str {
        &self.fields().contest().name
    }

    pub fn department(&self) -> &str {
        &self.fields().contest().department
    }
}

/// Stable ascending sort by timestamp; equal timestamps keep their order.
pub fn sort_by_timestamp<F: Entry>(records: &mut [Record<F>]) {
    records.sort_by_key(|r| r.timestamp());
}

/// Flat on-disk shape of a record.
#[derive(Serialize, Deserialize)]
struct RecordRepr<F> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(flatten)]
    fields: F,
}

impl<F> From<RecordRepr<F>> for Record<F> {
    fn from(repr: RecordRepr<F>) -> Self {
        match repr.id {
            Some(id) => Record::Persisted {
                id,
                fields: repr.fields,
            },
            None => Record::Pending(repr.fields),
        }
    }
}

impl<F> From<Record<F>> for RecordRepr<F> {
    fn from(record: Record<F>) -> Self {
        match record {
            Record::Pending(fields) => RecordRepr { id: None, fields },
            Record::Persisted { id, fields } => RecordRepr {
                id: Some(id),
                fields,
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
