//! Bridge configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use agora_types::NetworkId;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for the Agora bridge service.
///
/// Can be loaded from a TOML file via [`BridgeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Which network's governance contract to monitor.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Data directory for the persistent store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for rotating store snapshots.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Seconds between governance polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds between scheduled backups.
    #[serde(default = "default_backup_interval_secs")]
    pub backup_interval_secs: u64,

    /// Number of snapshot files to keep.
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,

    /// Maximum thread-publish attempts per proposal before giving up.
    #[serde(default = "default_publish_retry_attempts")]
    pub publish_retry_attempts: u32,

    /// When set, incoming community votes are rejected and the service only
    /// mirrors on-chain state.
    #[serde(default)]
    pub read_only: bool,

    /// Override the network's default JSON-RPC endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Override the network's default explorer API endpoint.
    #[serde(default)]
    pub explorer_url: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Mainnet
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./agora_data")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("./agora_data/backups")
}

fn default_poll_interval_secs() -> u64 {
    3 * 60 * 60
}

fn default_backup_interval_secs() -> u64 {
    6 * 60 * 60
}

fn default_backup_retention() -> usize {
    agora_backup::manager::DEFAULT_RETENTION
}

fn default_publish_retry_attempts() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The JSON-RPC endpoint to use, honouring the override.
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    /// The explorer API endpoint to use, honouring the override.
    pub fn explorer_url(&self) -> String {
        self.explorer_url
            .clone()
            .unwrap_or_else(|| self.network.default_explorer_url().to_string())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            data_dir: default_data_dir(),
            backup_dir: default_backup_dir(),
            poll_interval_secs: default_poll_interval_secs(),
            backup_interval_secs: default_backup_interval_secs(),
            backup_retention: default_backup_retention(),
            publish_retry_attempts: default_publish_retry_attempts(),
            read_only: false,
            rpc_url: None,
            explorer_url: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, NetworkId::Mainnet);
        assert_eq!(config.poll_interval_secs, 10_800);
        assert_eq!(config.backup_retention, 5);
        assert!(!config.read_only);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn log_settings_come_from_toml() {
        let toml = r#"
            log_format = "json"
            log_level = "debug"
        "#;
        let config = BridgeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "testnet"
            poll_interval_secs = 60
            read_only = true
        "#;
        let config = BridgeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.network, NetworkId::Testnet);
        assert_eq!(config.poll_interval_secs, 60);
        assert!(config.read_only);
        assert_eq!(config.backup_retention, 5); // default
    }

    #[test]
    fn url_overrides_take_precedence() {
        let toml = r#"
            rpc_url = "http://localhost:8545"
        "#;
        let config = BridgeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_url(), "http://localhost:8545");
        assert_eq!(
            config.explorer_url(),
            NetworkId::Mainnet.default_explorer_url()
        );
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BridgeConfig::from_toml_file("/nonexistent/agora.toml");
        assert!(matches!(result.unwrap_err(), NodeError::Config(_)));
    }
}
