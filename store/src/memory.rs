//! In-memory backend for tests and dry runs.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::{BridgeStore, Collection, Snapshot, StoreError, UpdateFn};

/// Non-durable [`BridgeStore`] with the same locking discipline as the
/// JSON-file backend: a per-key mutex serializes same-key updates.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<(Collection, String), Value>>,
    key_locks: Mutex<HashMap<(Collection, String), Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_lock(&self, collection: Collection, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().expect("key lock table poisoned");
        locks
            .entry((collection, key.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl BridgeStore for MemoryStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.read().expect("store lock poisoned");
        Ok(entries.get(&(collection, key.to_string())).cloned())
    }

    fn put(&self, collection: Collection, key: &str, value: Value) -> Result<(), StoreError> {
        let lock = self.key_lock(collection, key);
        let _guard = lock.lock().expect("key lock poisoned");
        let mut entries = self.entries.write().expect("store lock poisoned");
        entries.insert((collection, key.to_string()), value);
        Ok(())
    }

    fn atomic_update(
        &self,
        collection: Collection,
        key: &str,
        f: UpdateFn<'_>,
    ) -> Result<(), StoreError> {
        let lock = self.key_lock(collection, key);
        let _guard = lock.lock().expect("key lock poisoned");

        let current = {
            let entries = self.entries.read().expect("store lock poisoned");
            entries.get(&(collection, key.to_string())).cloned()
        };
        let next = f(current.clone());
        if next == current {
            return Ok(());
        }
        let mut entries = self.entries.write().expect("store lock poisoned");
        match next {
            Some(value) => entries.insert((collection, key.to_string()), value),
            None => entries.remove(&(collection, key.to_string())),
        };
        Ok(())
    }

    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, StoreError> {
        let entries = self.entries.read().expect("store lock poisoned");
        Ok(entries
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, k), v)| (k.clone(), v.clone()))
            .collect())
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let entries = self.entries.read().expect("store lock poisoned");
        let mut snapshot = Snapshot::new();
        for ((collection, key), value) in entries.iter() {
            snapshot.insert(*collection, key.clone(), value.clone());
        }
        Ok(snapshot)
    }

    fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        let mut entries = self.entries.write().expect("store lock poisoned");
        entries.clear();
        for collection in Collection::ALL {
            for (key, value) in snapshot.collection(collection) {
                entries.insert((collection, key), value);
            }
        }
        Ok(())
    }
}
