//! Durable JSON-file implementation of [`BridgeStore`].

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use agora_store::{BridgeStore, Collection, Snapshot, StoreError, UpdateFn};

use crate::JsonStoreError;

/// One JSON file per collection, loaded at open and kept in memory; every
/// mutation rewrites the file through a crash-safe temp-and-rename flush.
pub struct JsonStore {
    dir: PathBuf,
    collections: HashMap<Collection, CollectionFile>,
}

struct CollectionFile {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Serializes file rewrites; in-memory reads stay concurrent.
    flush_lock: Mutex<()>,
}

impl JsonStore {
    /// Open or create a store under `dir`, loading any existing collection
    /// files.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let mut collections = HashMap::new();
        for collection in Collection::ALL {
            let path = dir.join(format!("{}.json", collection.as_str()));
            let entries = if path.exists() {
                load_collection(&path)?
            } else {
                BTreeMap::new()
            };
            collections.insert(
                collection,
                CollectionFile {
                    path,
                    entries: RwLock::new(entries),
                    key_locks: Mutex::new(HashMap::new()),
                    flush_lock: Mutex::new(()),
                },
            );
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            collections,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, collection: Collection) -> &CollectionFile {
        // The map is populated for every variant in `open`.
        &self.collections[&collection]
    }
}

impl CollectionFile {
    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().expect("key lock table poisoned");
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Write the current entries to disk: temp file, fsync, atomic rename,
    /// fsync the directory. Either the old or the new file survives a crash.
    fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.flush_lock.lock().expect("flush lock poisoned");
        let bytes = {
            let entries = self.entries.read().expect("entries lock poisoned");
            serde_json::to_vec_pretty(&*entries)?
        };

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
            tmp.write_all(&bytes).map_err(|e| io_err(&tmp_path, e))?;
            tmp.sync_all().map_err(|e| io_err(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| io_err(&self.path, e))?;

        if let Some(parent) = self.path.parent() {
            // Rename durability needs the directory entry synced too.
            File::open(parent)
                .and_then(|d| d.sync_all())
                .map_err(|e| io_err(parent, e))?;
        }
        Ok(())
    }

    /// Apply `next` at `key` in memory, then flush. On flush failure the
    /// in-memory entry is rolled back so the store never claims a mutation
    /// it could not make durable.
    fn commit(&self, key: &str, next: Option<Value>) -> Result<(), StoreError> {
        let previous = {
            let mut entries = self.entries.write().expect("entries lock poisoned");
            match next {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            }
        };

        if let Err(e) = self.flush() {
            let mut entries = self.entries.write().expect("entries lock poisoned");
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl BridgeStore for JsonStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError> {
        let file = self.file(collection);
        let entries = file.entries.read().expect("entries lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn put(&self, collection: Collection, key: &str, value: Value) -> Result<(), StoreError> {
        let file = self.file(collection);
        let lock = file.key_lock(key);
        let _guard = lock.lock().expect("key lock poisoned");
        file.commit(key, Some(value))
    }

    fn atomic_update(
        &self,
        collection: Collection,
        key: &str,
        f: UpdateFn<'_>,
    ) -> Result<(), StoreError> {
        let file = self.file(collection);
        let lock = file.key_lock(key);
        let _guard = lock.lock().expect("key lock poisoned");

        let current = {
            let entries = file.entries.read().expect("entries lock poisoned");
            entries.get(key).cloned()
        };
        let next = f(current.clone());
        if next == current {
            // No change, no write. Double-polling identical chain data must
            // leave the files byte-identical.
            return Ok(());
        }
        file.commit(key, next)
    }

    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, StoreError> {
        let file = self.file(collection);
        let entries = file.entries.read().expect("entries lock poisoned");
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let mut snapshot = Snapshot::new();
        for collection in Collection::ALL {
            let file = self.file(collection);
            let entries = file.entries.read().expect("entries lock poisoned");
            for (key, value) in entries.iter() {
                snapshot.insert(collection, key.clone(), value.clone());
            }
        }
        Ok(snapshot)
    }

    fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let file = self.file(collection);
            {
                let mut entries = file.entries.write().expect("entries lock poisoned");
                *entries = snapshot.collection(collection);
            }
            file.flush()?;
        }
        tracing::info!(entries = snapshot.len(), "restored store from snapshot");
        Ok(())
    }
}

fn load_collection(path: &Path) -> Result<BTreeMap<String, Value>, StoreError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    let entries = serde_json::from_slice(&bytes).map_err(|e| {
        StoreError::from(JsonStoreError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    })?;
    Ok(entries)
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    JsonStoreError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn open_temp() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonStore::open(dir.path()).expect("open store");
        (dir, store)
    }

    #[test]
    fn put_get_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonStore::open(dir.path()).unwrap();
            store
                .put(Collection::Proposals, "1", json!({"title": "p1"}))
                .unwrap();
        }

        // A fresh open must see the durable state.
        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(Collection::Proposals, "1").unwrap(),
            Some(json!({"title": "p1"}))
        );
    }

    #[test]
    fn unchanged_update_leaves_file_bytes_identical() {
        let (dir, store) = open_temp();
        store.put(Collection::Proposals, "1", json!({"n": 1})).unwrap();

        let path = dir.path().join("proposals.json");
        let before = fs::read(&path).unwrap();

        store
            .atomic_update(Collection::Proposals, "1", &mut |cur| cur)
            .unwrap();

        let after = fs::read(&path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn atomic_update_persists_each_step() {
        let (dir, store) = open_temp();
        store
            .atomic_update(Collection::CommunityVotes, "7", &mut |cur| {
                assert!(cur.is_none());
                Some(json!({"aye": 1}))
            })
            .unwrap();

        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(Collection::CommunityVotes, "7").unwrap(),
            Some(json!({"aye": 1}))
        );
    }

    #[test]
    fn snapshot_round_trip_across_backends() {
        let (_dir, store) = open_temp();
        store.put(Collection::Proposals, "1", json!({"a": 1})).unwrap();
        store
            .put(Collection::CommunityVotes, "1", json!({"b": 2}))
            .unwrap();
        store
            .put(Collection::OnChainVotes, "1", json!({"c": 3}))
            .unwrap();

        let snapshot = store.snapshot().unwrap();

        let dir2 = tempfile::tempdir().unwrap();
        let restored = JsonStore::open(dir2.path()).unwrap();
        restored.restore(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot().unwrap(), snapshot);

        // And the restore itself is durable.
        drop(restored);
        let reopened = JsonStore::open(dir2.path()).unwrap();
        assert_eq!(reopened.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn malformed_collection_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("proposals.json"), b"{ not json").unwrap();

        let result = JsonStore::open(dir.path());
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn no_leftover_temp_files_after_writes() {
        let (dir, store) = open_temp();
        for i in 0..10 {
            store
                .put(Collection::OnChainVotes, &i.to_string(), json!(i))
                .unwrap();
        }
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn concurrent_same_key_updates_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::open(dir.path()).unwrap());
        store.put(Collection::CommunityVotes, "1", json!(0)).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    store
                        .atomic_update(Collection::CommunityVotes, "1", &mut |cur| {
                            let n = cur.and_then(|v| v.as_u64()).unwrap_or(0);
                            Some(json!(n + 1))
                        })
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            store.get(Collection::CommunityVotes, "1").unwrap(),
            Some(json!(100))
        );
    }
}
