//! Network identifier and per-network presets.

use serde::{Deserialize, Serialize};

/// Identifies which governance network the bridge is connected to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Mainnet,
    /// The public test network.
    Testnet,
    /// Local development node.
    Dev,
}

impl NetworkId {
    /// EVM chain id for this network.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 43_111,
            Self::Testnet => 743_111,
            Self::Dev => 1_337,
        }
    }

    /// Default JSON-RPC endpoint.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://rpc.hemi.network/rpc",
            Self::Testnet => "https://testnet.rpc.hemi.network/rpc",
            Self::Dev => "http://127.0.0.1:8545",
        }
    }

    /// Default explorer API base (source of the governance proposal list).
    pub fn default_explorer_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://explorer.hemi.xyz/api/v2",
            Self::Testnet => "https://testnet.explorer.hemi.xyz/api/v2",
            Self::Dev => "http://127.0.0.1:4000/api/v2",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Dev => "dev",
        }
    }
}
