//! Key-value persistence adapters.
//!
//! # Responsibility
//! - Define the slot-level read/write/remove contract used by the item store.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Reading an absent key is `Ok(None)`, not an error.
//! - Removing an absent key is `Ok(())`.
//! - Adapters are shareable with the background writer (`Send + Sync`).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a key-value adapter or its SQLite bootstrap.
#[derive(Debug)]
pub enum StorageError {
    /// The storage medium cannot be reached.
    Unavailable(String),
    /// A SQLite call on the slot table failed.
    Sqlite(rusqlite::Error),
    /// The slot database was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Sqlite(err) => write!(f, "slot database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Unavailable(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Slot-level storage capability backing the item store.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}
