//! Item identifier generation.
//!
//! # Invariants
//! - Generated ids are unique within the process lifetime.
//! - Generated ids sort in creation order (UUID v7 layout).

use crate::model::item::ItemId;
use uuid::Uuid;

/// Source of fresh item identifiers.
pub trait IdGenerator: Send {
    fn generate(&self) -> ItemId;
}

/// Time-ordered UUID v7 generator.
///
/// `Uuid::now_v7` keeps a process-wide counter, so ids created in the same
/// millisecond still compare in creation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> ItemId {
        ItemId::new(Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, UuidV7Generator};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique_and_sorted() {
        let generator = UuidV7Generator;
        let ids = (0..256).map(|_| generator.generate()).collect::<Vec<_>>();

        let unique = ids.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), ids.len());

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }
}
