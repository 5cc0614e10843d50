pub mod engine;
pub mod identity;
pub mod types;

pub use engine::SyncEngine;
pub use identity::IdMapping;
pub use types::{
    Collections, DataSource, SyncEngineOptions, SyncErrorCallback, SyncErrorEvent, SyncErrorKind,
    SyncOutcome, SyncPhase,
};
