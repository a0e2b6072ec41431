//! Point-in-time store snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::Collection;

/// A full copy of the store's collections.
///
/// Uses `BTreeMap` throughout so two snapshots of equal state serialize to
/// byte-identical JSON, which is what the idempotent-poll guarantee is
/// checked against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub collections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one collection, empty if the snapshot has none.
    pub fn collection(&self, collection: Collection) -> BTreeMap<String, Value> {
        self.collections
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn insert(&mut self, collection: Collection, key: String, value: Value) {
        self.collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(key, value);
    }

    /// Total number of entries across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_state_serializes_identically() {
        let mut a = Snapshot::new();
        a.insert(Collection::Proposals, "2".into(), json!({"x": 2}));
        a.insert(Collection::Proposals, "1".into(), json!({"x": 1}));

        let mut b = Snapshot::new();
        b.insert(Collection::Proposals, "1".into(), json!({"x": 1}));
        b.insert(Collection::Proposals, "2".into(), json!({"x": 2}));

        let a_bytes = serde_json::to_vec(&a).unwrap();
        let b_bytes = serde_json::to_vec(&b).unwrap();
        assert_eq!(a_bytes, b_bytes);
    }

    #[test]
    fn missing_collection_is_empty() {
        let snap = Snapshot::new();
        assert!(snap.collection(Collection::CommunityVotes).is_empty());
        assert!(snap.is_empty());
    }
}
