use crate::error::CacheError;

/// Raw snapshot slots keyed by string.
///
/// A slot holds one serialized snapshot and is only ever replaced whole, so a
/// reader never observes a partial write. Implementors must be `Send + Sync`
/// so the engine can share them.
pub trait CacheBackend: Send + Sync {
    /// Read the slot, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replace the slot's contents.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}
