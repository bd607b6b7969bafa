//! To-do item store.
//!
//! # Responsibility
//! - Own the in-memory item collection and its mutation rules.
//! - Write every mutation through to the storage slot per `WritePolicy`.
//! - Degrade to an empty list when persisted state cannot be loaded.
//!
//! # Invariants
//! - In-memory state is authoritative; persistence failures never change it,
//!   and storage is only loaded once per store.
//! - Only `is_completed` changes after an item is created.
//! - `clear` removes the storage slot instead of writing an empty document.
//! - Every mutating call returns a snapshot of the post-mutation state.

use crate::codec::{decode, encode};
use crate::config::{ConfigError, StoreConfig};
use crate::model::clock::{Clock, SystemClock};
use crate::model::id::{IdGenerator, UuidV7Generator};
use crate::model::item::{Item, ItemCollection, ItemId};
use crate::persist::{PersistOp, PersistStats, Persister, WritePolicy};
use crate::storage::KeyValueStore;
use log::{debug, error, info, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Local failure classes handled inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    /// The storage medium could not be reached.
    StorageUnavailable,
    /// Persisted bytes were not a valid item document.
    DecodeFailure,
}

impl StoreFault {
    pub fn code(self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::DecodeFailure => "decode_failure",
        }
    }
}

impl Display for StoreFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of the one storage load performed by `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// `initialize` has not run yet.
    Pending,
    /// No slot was stored (first run, or after `clear`).
    Empty,
    /// Items were restored from the slot.
    Loaded(usize),
    /// Loading failed and the store started empty.
    Degraded(StoreFault),
}

/// In-memory to-do list with write-through persistence.
pub struct ItemStore {
    items: ItemCollection,
    ready: bool,
    init_outcome: InitOutcome,
    persister: Persister,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl ItemStore {
    /// Creates a store with UUID v7 ids and the system clock.
    ///
    /// The store is not ready until `initialize` runs.
    pub fn new(storage: Arc<dyn KeyValueStore>, config: StoreConfig) -> Result<Self, ConfigError> {
        Self::with_sources(
            storage,
            config,
            Box::new(UuidV7Generator),
            Box::new(SystemClock),
        )
    }

    /// Creates a store with caller-provided id and time sources.
    pub fn with_sources(
        storage: Arc<dyn KeyValueStore>,
        config: StoreConfig,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            items: ItemCollection::new(),
            ready: false,
            init_outcome: InitOutcome::Pending,
            persister: Persister::new(storage, config.storage_key, config.write_policy),
            ids,
            clock,
        })
    }

    /// Loads persisted items, falling back to an empty list on any fault.
    ///
    /// Always leaves the store ready. Once ready, later calls return the
    /// in-memory snapshot without reading storage again.
    pub fn initialize(&mut self) -> ItemCollection {
        if self.ready {
            debug!("event=store_init module=store status=skipped reason=already_ready");
            return self.snapshot();
        }

        let (items, outcome) = match self.persister.read() {
            Ok(None) => (ItemCollection::new(), InitOutcome::Empty),
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(items) => {
                    let count = items.len();
                    (items, InitOutcome::Loaded(count))
                }
                Err(err) => {
                    warn!(
                        "event=store_init module=store status=degraded error_code={} error={err}",
                        StoreFault::DecodeFailure
                    );
                    (
                        ItemCollection::new(),
                        InitOutcome::Degraded(StoreFault::DecodeFailure),
                    )
                }
            },
            Err(err) => {
                error!(
                    "event=store_init module=store status=degraded error_code={} error={err}",
                    StoreFault::StorageUnavailable
                );
                (
                    ItemCollection::new(),
                    InitOutcome::Degraded(StoreFault::StorageUnavailable),
                )
            }
        };

        self.items = items;
        self.ready = true;
        self.init_outcome = outcome;
        info!(
            "event=store_init module=store status=ok count={} policy={}",
            self.items.len(),
            self.persister.policy().label()
        );
        self.snapshot()
    }

    /// Whether `initialize` has completed; frontends show a spinner until then.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn init_outcome(&self) -> InitOutcome {
        self.init_outcome
    }

    /// Returns a snapshot of the current items.
    pub fn snapshot(&self) -> ItemCollection {
        self.items.clone()
    }

    /// Adds an open item; empty or whitespace-only text is ignored.
    pub fn add(&mut self, text: &str) -> ItemCollection {
        if text.trim().is_empty() {
            debug!("event=store_add module=store status=skipped reason=blank_text");
            return self.snapshot();
        }

        let item = Item::new(self.ids.generate(), text, self.clock.now_ms());
        debug!("event=store_add module=store status=ok item_id={}", item.id);
        self.items.insert(item);
        self.write_through();
        self.snapshot()
    }

    /// Deletes one item; an unknown id is a no-op.
    pub fn delete(&mut self, id: &ItemId) -> ItemCollection {
        if self.items.remove(id).is_none() {
            debug!("event=store_delete module=store status=skipped reason=not_found item_id={id}");
            return self.snapshot();
        }

        debug!("event=store_delete module=store status=ok item_id={id}");
        self.write_through();
        self.snapshot()
    }

    /// Sets the completion flag of one item; an unknown id is a no-op.
    pub fn set_completed(&mut self, id: &ItemId, value: bool) -> ItemCollection {
        let Some(updated) = self.items.get(id).map(|item| item.with_completed(value)) else {
            debug!(
                "event=store_set_completed module=store status=skipped reason=not_found item_id={id}"
            );
            return self.snapshot();
        };

        self.items.insert(updated);
        debug!("event=store_set_completed module=store status=ok item_id={id} value={value}");
        self.write_through();
        self.snapshot()
    }

    pub fn complete(&mut self, id: &ItemId) -> ItemCollection {
        self.set_completed(id, true)
    }

    pub fn incomplete(&mut self, id: &ItemId) -> ItemCollection {
        self.set_completed(id, false)
    }

    /// Removes every item and deletes the storage slot.
    pub fn clear(&mut self) -> ItemCollection {
        let removed = self.items.len();
        self.items.clear();
        self.persister.submit(PersistOp::Remove);
        info!("event=store_clear module=store status=ok removed={removed}");
        self.snapshot()
    }

    /// Blocks until queued persistence work has been attempted.
    pub fn flush(&self) {
        self.persister.flush();
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.persister.policy()
    }

    pub fn persist_stats(&self) -> PersistStats {
        self.persister.stats()
    }

    fn write_through(&self) {
        match encode(&self.items) {
            Ok(bytes) => self.persister.submit(PersistOp::Write(bytes)),
            Err(err) => error!(
                "event=store_persist module=store status=error error_code=encode_failed error={err}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InitOutcome, ItemStore};
    use crate::config::StoreConfig;
    use crate::storage::MemoryKeyValueStore;
    use std::sync::Arc;

    #[test]
    fn store_is_not_ready_before_initialize() {
        let store = ItemStore::new(Arc::new(MemoryKeyValueStore::new()), StoreConfig::default())
            .unwrap();
        assert!(!store.is_ready());
        assert_eq!(store.init_outcome(), InitOutcome::Pending);
    }

    #[test]
    fn blank_storage_key_fails_construction() {
        let config = StoreConfig {
            storage_key: String::new(),
            ..StoreConfig::default()
        };
        assert!(ItemStore::new(Arc::new(MemoryKeyValueStore::new()), config).is_err());
    }
}
