//! Store configuration and storage path resolution.
//!
//! # Invariants
//! - The storage key is one canonical, non-empty string used for every
//!   read, write and remove.

use crate::persist::WritePolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Canonical slot key holding the serialized item collection.
pub const DEFAULT_STORAGE_KEY: &str = "ToDos";
/// Environment variable overriding the on-device database path.
pub const DB_PATH_ENV: &str = "TODO_DB_PATH";
/// Database file name used when no override is set.
pub const DEFAULT_DB_FILE_NAME: &str = "todo_items.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage key cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Item store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub write_policy: WritePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Rejects configurations the store cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }
}

/// Resolves the database path from `TODO_DB_PATH`, else the temp directory.
pub fn resolve_db_path() -> PathBuf {
    db_path_from(std::env::var(DB_PATH_ENV).ok())
}

fn db_path_from(raw: Option<String>) -> PathBuf {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{db_path_from, ConfigError, StoreConfig, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "ToDos");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let config = StoreConfig {
            storage_key: "  ".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyStorageKey));
    }

    #[test]
    fn db_path_prefers_trimmed_override() {
        assert_eq!(
            db_path_from(Some(" /data/todo.sqlite3 ".to_string())),
            PathBuf::from("/data/todo.sqlite3")
        );
        assert!(db_path_from(Some("   ".to_string())).ends_with(DEFAULT_DB_FILE_NAME));
        assert!(db_path_from(None).ends_with(DEFAULT_DB_FILE_NAME));
    }
}
