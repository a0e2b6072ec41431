//! Typed access on top of the value-oriented [`BridgeStore`] trait.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BridgeStore, Collection, StoreError};

/// Serde-typed helpers over any [`BridgeStore`], including trait objects.
pub trait BridgeStoreExt: BridgeStore {
    fn get_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.get(collection, key)? {
            Some(value) => {
                let record = serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                    collection: collection.as_str(),
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put_typed<T: Serialize>(
        &self,
        collection: Collection,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.put(collection, key, value)
    }

    /// Typed read-modify-write. If the stored value does not decode as `T`
    /// the update is aborted and the stored value is left untouched.
    fn update_typed<T, F>(
        &self,
        collection: Collection,
        key: &str,
        mut f: F,
    ) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(Option<T>) -> Option<T>,
    {
        let mut codec_error: Option<StoreError> = None;
        self.atomic_update(collection, key, &mut |current| {
            let decoded = match current.clone().map(serde_json::from_value::<T>).transpose() {
                Ok(record) => record,
                Err(e) => {
                    codec_error = Some(StoreError::Corrupt {
                        collection: collection.as_str(),
                        key: key.to_string(),
                        reason: e.to_string(),
                    });
                    return current;
                }
            };
            match f(decoded).map(|record| serde_json::to_value(&record)).transpose() {
                Ok(next) => next,
                Err(e) => {
                    codec_error = Some(StoreError::Serialization(e.to_string()));
                    current
                }
            }
        })?;
        match codec_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: BridgeStore + ?Sized> BridgeStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        n: u64,
    }

    #[test]
    fn typed_round_trip() {
        let store = MemoryStore::new();
        store
            .put_typed(Collection::Proposals, "1", &Record { n: 7 })
            .unwrap();
        let got: Option<Record> = store.get_typed(Collection::Proposals, "1").unwrap();
        assert_eq!(got, Some(Record { n: 7 }));
    }

    #[test]
    fn update_typed_inserts_and_mutates() {
        let store = MemoryStore::new();
        store
            .update_typed::<Record, _>(Collection::Proposals, "1", |cur| {
                assert!(cur.is_none());
                Some(Record { n: 1 })
            })
            .unwrap();
        store
            .update_typed::<Record, _>(Collection::Proposals, "1", |cur| {
                let mut record = cur.unwrap();
                record.n += 1;
                Some(record)
            })
            .unwrap();
        let got: Option<Record> = store.get_typed(Collection::Proposals, "1").unwrap();
        assert_eq!(got, Some(Record { n: 2 }));
    }

    #[test]
    fn corrupt_value_aborts_update_without_mutation() {
        let store = MemoryStore::new();
        store
            .put(Collection::Proposals, "1", json!("not a record"))
            .unwrap();

        let result = store.update_typed::<Record, _>(Collection::Proposals, "1", |_| {
            Some(Record { n: 99 })
        });
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));

        // The bad value is still there, untouched.
        let raw = store.get(Collection::Proposals, "1").unwrap();
        assert_eq!(raw, Some(json!("not a record")));
    }
}
