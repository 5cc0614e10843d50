//! Local durable cache: the fallback copy of every collection.
//!
//! - [`traits`]: [`CacheBackend`], the raw string-keyed slot store.
//! - [`memory`]: [`MemoryCache`], process-local slots.
//! - [`sqlite`]: [`SqliteCache`], slots in a SQLite table (feature `sqlite`).
//! - [`local`]: [`LocalCache`], typed whole-snapshot reads and writes.

pub mod local;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use local::LocalCache;
pub use memory::MemoryCache;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
pub use traits::CacheBackend;
