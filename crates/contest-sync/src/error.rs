use thiserror::Error;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Malformed cache snapshot in \"{namespace}\"")]
    MalformedSnapshot {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode snapshot for \"{namespace}\"")]
    Encode {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

/// Classification of remote store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Network failure, timeout, or the store refused to serve the request.
    Unavailable,
    /// The store rejected the payload (constraint or validation failure).
    Rejected,
    /// The addressed record does not exist.
    NotFound,
}

/// Error returned by a [`RemoteStore`](crate::remote::RemoteStore) call.
///
/// Wraps arbitrary transport messages; the engine treats every kind as
/// "remote unavailable" and falls back to the local cache.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub kind: RemoteErrorKind,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RemoteErrorKind::Unavailable,
        }
    }

    pub fn with_kind(message: impl Into<String>, kind: RemoteErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No eligible candidates available for selection")]
    NoEligibleCandidates,
}

// ---------------------------------------------------------------------------
// BackupError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid backup document")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize backup")]
    Serialize(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ContestSyncError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ContestSyncError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Backup(#[from] BackupError),
}

/// Crate result type, defaulting to `ContestSyncError`.
pub type Result<T, E = ContestSyncError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
