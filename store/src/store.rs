//! The `BridgeStore` trait and the three logical collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{Snapshot, StoreError};

/// The three durable collections, each keyed by proposal id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Proposal cache: the locally mirrored chain proposals.
    Proposals,
    /// Community vote ledgers collected through the vote widget.
    CommunityVotes,
    /// Latest observed on-chain vote records.
    OnChainVotes,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Self::Proposals,
        Self::CommunityVotes,
        Self::OnChainVotes,
    ];

    /// Stable name, used as the snapshot key and the backing file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposals => "proposals",
            Self::CommunityVotes => "community_votes",
            Self::OnChainVotes => "onchain_votes",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-modify-write closure for [`BridgeStore::atomic_update`].
///
/// Receives the current value (if any) and returns the value to store;
/// returning `None` leaves an absent key absent and deletes a present one.
pub type UpdateFn<'a> = &'a mut dyn FnMut(Option<Value>) -> Option<Value>;

/// Durable key-value storage for the bridge.
///
/// Contract required by the monitor and reconciler:
/// - `atomic_update` serializes concurrent updates to the same key and
///   allows full parallelism across different keys.
/// - Every mutation is durable before the call returns. A crash right after
///   an externally visible side effect must never leave the store believing
///   the side effect did not happen.
pub trait BridgeStore: Send + Sync {
    /// Get the value at `key`, or `None` if absent.
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` at `key`, replacing any existing value.
    fn put(&self, collection: Collection, key: &str, value: Value) -> Result<(), StoreError>;

    /// Read-modify-write under a per-key lock.
    fn atomic_update(
        &self,
        collection: Collection,
        key: &str,
        f: UpdateFn<'_>,
    ) -> Result<(), StoreError>;

    /// All entries of a collection.
    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, StoreError>;

    /// Point-in-time copy of all collections, restorable without loss.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Replace the full store contents with `snapshot`.
    fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError>;
}
