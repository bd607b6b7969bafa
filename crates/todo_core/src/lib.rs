//! Core domain logic for the to-do list app.
//! This crate is the single source of truth for item invariants.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod storage;

pub use codec::{decode, encode, CodecError};
pub use config::{resolve_db_path, ConfigError, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::clock::{Clock, SystemClock};
pub use model::id::{IdGenerator, UuidV7Generator};
pub use model::item::{Item, ItemCollection, ItemId};
pub use persist::{PersistStats, WritePolicy};
pub use service::item_store::{InitOutcome, ItemStore, StoreFault};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
