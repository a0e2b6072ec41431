//! Abstract storage for the Agora governance bridge.
//!
//! Every storage backend (the durable JSON-file store, in-memory for
//! testing) implements [`BridgeStore`]. The monitor and reconciler depend
//! only on the trait; `atomic_update` is their sole mutation path.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod typed;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use store::{BridgeStore, Collection, UpdateFn};
pub use typed::BridgeStoreExt;
