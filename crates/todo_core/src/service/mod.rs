//! Core use-case services.
//!
//! # Responsibility
//! - Expose list operations to frontends without storage details.
//! - Keep FFI and CLI layers free of business rules.

pub mod item_store;
