//! SQLite cache backend.
//!
//! One row per slot in a `snapshots` table. The connection sits behind a
//! `parking_lot::Mutex` because `rusqlite::Connection` is `Send` but not
//! `Sync`.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};

use crate::error::{CacheError, Result};

use super::traits::CacheBackend;

pub struct SqliteCache {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteCache {
    /// Open (or create) a file-backed cache.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path).map_err(CacheError::from)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(CacheError::from)?;
        Ok(Self::with_connection(conn)?)
    }

    /// Open an in-memory cache (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(CacheError::from)?;
        Ok(Self::with_connection(conn)?)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshots (
                key        TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CacheBackend for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn.lock();
        let payload = conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
