//! In-process key-value adapter.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Map-backed adapter whose medium can be switched offline.
///
/// While offline every call fails with `StorageError::Unavailable`, which
/// lets callers exercise degraded paths without a real device.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated medium availability.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns whether `key` currently holds a value, ignoring availability.
    pub fn contains(&self, key: &str) -> bool {
        self.lock_slots()
            .map(|slots| slots.contains_key(key))
            .unwrap_or(false)
    }

    /// Stores raw bytes directly, ignoring availability.
    pub fn seed(&self, key: &str, value: &[u8]) {
        if let Ok(mut slots) = self.lock_slots() {
            slots.insert(key.to_string(), value.to_vec());
        }
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn lock_slots(&self) -> StorageResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_online()?;
        Ok(self.lock_slots()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.ensure_online()?;
        self.lock_slots()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.ensure_online()?;
        self.lock_slots()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn read_absent_key_is_none() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.read("ToDos").unwrap(), None);
    }

    #[test]
    fn offline_store_rejects_every_call() {
        let store = MemoryKeyValueStore::new();
        store.set_offline(true);

        assert!(matches!(store.read("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.write("k", b"v"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.remove("k"), Err(StorageError::Unavailable(_))));
        assert!(!store.contains("k"));
    }
}
