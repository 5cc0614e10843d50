pub mod memory;
pub mod types;

pub use memory::MemoryRemoteStore;
pub use types::{RemoteRow, RemoteStore, StoredRow};
