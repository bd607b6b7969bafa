//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the canonical item record and the keyed collection that owns it.
//! - Provide the identity and time sources used when items are created.
//!
//! # Invariants
//! - Every item is identified by an `ItemId` that is never reused.
//! - Every collection key equals the `id` of the item stored under it.

pub mod clock;
pub mod id;
pub mod item;
