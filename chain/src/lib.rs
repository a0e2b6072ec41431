//! Chain access for the Agora governance bridge.
//!
//! The monitor depends only on the [`ChainReader`] trait; the concrete
//! [`HttpChainReader`] talks JSON-RPC to an Ethereum-compatible node for
//! connectivity checks and reads the governance proposal list from the
//! network's explorer API. All access is read-only and idempotent — the
//! bridge never writes back to the chain.

pub mod error;
pub mod http;
pub mod reader;
pub mod wire;

pub use error::ChainError;
pub use http::HttpChainReader;
pub use reader::{ChainProposal, ChainReader};
