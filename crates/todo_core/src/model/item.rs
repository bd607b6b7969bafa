//! Item domain model and keyed collection.
//!
//! # Responsibility
//! - Define the to-do record shown as one row of the list.
//! - Keep the id → item mapping and its newest-first projection.
//!
//! # Invariants
//! - `id`, `text` and `created_at` never change after creation.
//! - `is_completed` is the only mutable field.
//! - A collection key always equals the stored item's `id`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable identifier of one to-do item.
///
/// Serialized as a plain string so persisted documents stay readable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One entry of the to-do list.
///
/// Field names on the wire are camelCase (`isCompleted`, `createdAt`) to stay
/// compatible with documents written by the mobile app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// User-supplied text. Length is bounded by the input surface, not here.
    pub text: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Item {
    /// Creates an open (not completed) item.
    ///
    /// Crate-private: items are only created through `ItemStore::add`.
    pub(crate) fn new(id: ItemId, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            text: text.into(),
            is_completed: false,
            created_at,
        }
    }

    /// Returns a copy with `is_completed` replaced and every other field kept.
    pub fn with_completed(&self, value: bool) -> Self {
        Self {
            is_completed: value,
            ..self.clone()
        }
    }
}

/// Full set of items keyed by id.
///
/// Values of this type are snapshots: store operations hand out clones, so a
/// caller never observes a later mutation through a value it already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCollection {
    items: BTreeMap<ItemId, Item>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Iterates items in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Returns items ordered for display: newest `created_at` first.
    ///
    /// Ties are broken by id descending; generated ids are time-ordered, so
    /// this keeps insertion order reversed even within one millisecond.
    pub fn newest_first(&self) -> Vec<&Item> {
        let mut ordered = self.items.values().collect::<Vec<_>>();
        ordered.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        ordered
    }

    /// Returns the first key whose entry does not match its item id.
    pub fn first_key_mismatch(&self) -> Option<(&ItemId, &ItemId)> {
        self.items
            .iter()
            .find(|(key, item)| **key != item.id)
            .map(|(key, item)| (key, &item.id))
    }

    pub(crate) fn insert(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    pub(crate) fn remove(&mut self, id: &ItemId) -> Option<Item> {
        self.items.remove(id)
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemCollection, ItemId};

    #[test]
    fn with_completed_keeps_other_fields() {
        let item = Item::new(ItemId::from("a"), "Buy milk", 10);
        let done = item.with_completed(true);
        assert!(done.is_completed);
        assert_eq!(done.id, item.id);
        assert_eq!(done.text, item.text);
        assert_eq!(done.created_at, item.created_at);
    }

    #[test]
    fn newest_first_breaks_timestamp_ties_by_id() {
        let mut items = ItemCollection::new();
        items.insert(Item::new(ItemId::from("01"), "first", 5));
        items.insert(Item::new(ItemId::from("02"), "second", 5));
        items.insert(Item::new(ItemId::from("00"), "oldest", 1));

        let texts = items
            .newest_first()
            .into_iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["second", "first", "oldest"]);
    }
}
