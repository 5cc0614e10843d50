//! Sync-specific types: engine options, outcomes, and error events.

use std::sync::Arc;

use crate::cache::CacheBackend;
use crate::remote::RemoteStore;
use crate::types::{Collection, EliteEntry, Loser, Winner};

// ============================================================================
// Outcomes
// ============================================================================

/// Where the data in an outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Freshly read from the remote store.
    Remote,
    /// Served from the local cache or from local fallback writes; may
    /// diverge from the remote store.
    Cache,
}

/// Result of an engine operation. Always carries usable data; failures are
/// listed in `errors`, never returned.
#[derive(Debug, Clone)]
pub struct SyncOutcome<T> {
    pub data: T,
    pub source: DataSource,
    pub errors: Vec<SyncErrorEvent>,
}

impl<T> SyncOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        self.source == DataSource::Cache
    }
}

/// Immutable view of all three collections.
#[derive(Debug, Clone)]
pub struct Collections {
    pub winners: Arc<[Winner]>,
    pub losers: Arc<[Loser]>,
    pub elite_entries: Arc<[EliteEntry]>,
}

// ============================================================================
// Errors
// ============================================================================

/// Classification of absorbed failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// A remote store call failed; the cache path was taken.
    RemoteUnavailable,
    /// The cached snapshot could not be parsed; treated as empty.
    MalformedCacheSnapshot,
    /// The cache backend could not be read; treated as empty.
    CacheRead,
    /// The cache backend rejected a snapshot write.
    CacheWrite,
    /// An elite entry referenced a winner that is not in the snapshot.
    DanglingReference,
}

/// Which operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Load,
    Create,
    Delete,
    Restore,
}

/// An absorbed failure, collected in `SyncOutcome.errors`.
#[derive(Debug, Clone)]
pub struct SyncErrorEvent {
    pub phase: SyncPhase,
    pub collection: Collection,
    pub id: Option<String>,
    pub error: String,
    pub kind: SyncErrorKind,
}

// ============================================================================
// Options
// ============================================================================

/// Callback type for sync error events.
pub type SyncErrorCallback = dyn Fn(&SyncErrorEvent) + Send + Sync;

/// Configuration for `SyncEngine`.
pub struct SyncEngineOptions {
    pub remote: Arc<dyn RemoteStore>,
    pub cache: Arc<dyn CacheBackend>,
    /// Prefix for cache slot keys (default: `"contest"`)
    pub key_prefix: Option<String>,
    /// Maximum chat ids kept per record (default and upper bound: 10)
    pub chat_id_limit: Option<usize>,
    /// Called for each absorbed error
    pub on_error: Option<Arc<SyncErrorCallback>>,
}

impl SyncEngineOptions {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            remote,
            cache,
            key_prefix: None,
            chat_id_limit: None,
            on_error: None,
        }
    }
}
