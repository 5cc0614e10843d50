//! Contest record store with remote-first persistence and a durable local
//! cache fallback.
//!
//! [`SyncEngine`](sync::SyncEngine) owns the winners, losers, and elite
//! entries. Writes go to a [`RemoteStore`](remote::RemoteStore) and are
//! re-read from it; when the remote is unreachable they land in the
//! [`LocalCache`](cache::LocalCache) instead, and the next successful load
//! brings both back in line.

pub mod backup;
pub mod cache;
pub mod error;
pub mod remote;
pub mod selection;
pub mod sync;
pub mod types;

pub use backup::Backup;
pub use error::{ContestSyncError, Result};
pub use sync::{SyncEngine, SyncEngineOptions, SyncOutcome};
pub use types::{
    CandidateGuide, Collection, ContestFields, EliteEntry, EliteFields, Loser, Record, Winner,
    WinnerRef,
};
