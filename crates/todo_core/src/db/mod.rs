//! SQLite bootstrap for on-device key-value storage.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing the storage slot table.
//! - Apply schema migrations before any slot is read or written.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer binary is refused, never downgraded.
//!
//! Failures are reported as `StorageError` so slot adapters return them as-is.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
