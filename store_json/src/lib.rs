//! JSON-file storage backend for the Agora governance bridge.
//!
//! One JSON file per collection under a data directory. Every mutation is
//! flushed to disk before the call returns, so a crash immediately after an
//! externally visible side effect never loses the recorded state.

pub mod error;
pub mod json_store;

pub use error::JsonStoreError;
pub use json_store::JsonStore;
