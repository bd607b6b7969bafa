//! Persisted document codec for the item collection.
//!
//! # Responsibility
//! - Encode the full collection as one JSON object keyed by item id.
//! - Decode persisted bytes back into a collection.
//!
//! # Invariants
//! - Decoding rejects documents whose keys differ from their item ids.
//! - A stored JSON `null` decodes to an empty collection.

use crate::model::item::{ItemCollection, ItemId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode/decode error for persisted item documents.
#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    KeyMismatch { key: ItemId, id: ItemId },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode items: {err}"),
            Self::Decode(err) => write!(f, "failed to decode items: {err}"),
            Self::KeyMismatch { key, id } => {
                write!(f, "persisted key `{key}` does not match item id `{id}`")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::KeyMismatch { .. } => None,
        }
    }
}

/// Serializes the collection to its persisted JSON form.
pub fn encode(items: &ItemCollection) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(items).map_err(CodecError::Encode)
}

/// Parses persisted bytes into a collection.
///
/// # Errors
/// - `Decode` when the bytes are not a JSON object of items.
/// - `KeyMismatch` when a key differs from the id of its item.
pub fn decode(bytes: &[u8]) -> CodecResult<ItemCollection> {
    let items = serde_json::from_slice::<Option<ItemCollection>>(bytes)
        .map_err(CodecError::Decode)?
        .unwrap_or_default();

    if let Some((key, id)) = items.first_key_mismatch() {
        return Err(CodecError::KeyMismatch {
            key: key.clone(),
            id: id.clone(),
        });
    }

    Ok(items)
}
