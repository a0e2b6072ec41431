//! Agora daemon — entry point for running the governance bridge.

use clap::Parser;
use std::path::PathBuf;

use agora_node::{init_logging, BridgeConfig, BridgeService, LogFormat, NodeError};
use agora_types::NetworkId;

#[derive(Parser)]
#[command(name = "agora-daemon", about = "Agora governance bridge daemon")]
struct Cli {
    /// Network to monitor: "mainnet", "testnet", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "AGORA_NETWORK")]
    network: Option<String>,

    /// Data directory for the persistent store.
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory for rotating store snapshots.
    #[arg(long, env = "AGORA_BACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Seconds between governance polls.
    #[arg(long, env = "AGORA_POLL_INTERVAL_SECS")]
    poll_interval_secs: Option<u64>,

    /// Seconds between scheduled backups.
    #[arg(long, env = "AGORA_BACKUP_INTERVAL_SECS")]
    backup_interval_secs: Option<u64>,

    /// Number of snapshot files to keep.
    #[arg(long, env = "AGORA_BACKUP_RETENTION")]
    backup_retention: Option<usize>,

    /// Reject community votes; only mirror on-chain state.
    #[arg(long, env = "AGORA_READ_ONLY")]
    read_only: bool,

    /// Override the network's default JSON-RPC endpoint.
    #[arg(long, env = "AGORA_RPC_URL")]
    rpc_url: Option<String>,

    /// Override the network's default explorer API endpoint.
    #[arg(long, env = "AGORA_EXPLORER_URL")]
    explorer_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value, or "info".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    /// Defaults to the config file's value, or "human".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the bridge service.
    Run,
}

fn parse_network(s: &str) -> NetworkId {
    match s.to_lowercase().as_str() {
        "mainnet" => NetworkId::Mainnet,
        "testnet" => NetworkId::Testnet,
        _ => NetworkId::Dev,
    }
}

/// Merge CLI flags over the file-derived base. Flags left unset keep the
/// file's value, including the log settings.
fn build_config(cli: &Cli, base: BridgeConfig) -> BridgeConfig {
    let cli_network = cli.network.as_deref().map(parse_network);

    BridgeConfig {
        network: cli_network.unwrap_or(base.network),
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        backup_dir: cli.backup_dir.clone().unwrap_or(base.backup_dir),
        poll_interval_secs: cli.poll_interval_secs.unwrap_or(base.poll_interval_secs),
        backup_interval_secs: cli
            .backup_interval_secs
            .unwrap_or(base.backup_interval_secs),
        backup_retention: cli.backup_retention.unwrap_or(base.backup_retention),
        publish_retry_attempts: base.publish_retry_attempts,
        read_only: cli.read_only || base.read_only,
        rpc_url: cli.rpc_url.clone().or(base.rpc_url),
        explorer_url: cli.explorer_url.clone().or(base.explorer_url),
        log_format: cli.log_format.unwrap_or(base.log_format),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Read the config file before installing the subscriber, so the file's
    // log settings apply when no CLI flag or env var overrides them. The
    // load outcome is reported once logging is up.
    let file_result: Option<(PathBuf, Result<BridgeConfig, NodeError>)> =
        cli.config.as_ref().map(|path| {
            let loaded = BridgeConfig::from_toml_file(&path.display().to_string());
            (path.clone(), loaded)
        });

    let base = match &file_result {
        Some((_, Ok(cfg))) => cfg.clone(),
        _ => BridgeConfig::default(),
    };
    let config = build_config(&cli, base);

    init_logging(config.log_format, &config.log_level);

    match &file_result {
        Some((path, Ok(_))) => tracing::info!("loaded config from {}", path.display()),
        Some((path, Err(e))) => tracing::warn!(
            "failed to load config file {}: {e}, using CLI defaults",
            path.display()
        ),
        None => {}
    }

    match cli.command {
        Command::Run => {
            tracing::info!(
                "starting Agora bridge on {} (chain id {}, poll every {}s{})",
                config.network.as_str(),
                config.network.chain_id(),
                config.poll_interval_secs,
                if config.read_only { ", read-only" } else { "" },
            );

            let mut service = BridgeService::new(config)?;
            service.start().await?;

            tracing::info!("shutdown signal received — stopping bridge");
            service.stop().await?;

            tracing::info!("agora daemon exited cleanly");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_log_settings_survive_when_cli_flags_are_unset() {
        let cli = Cli::parse_from(["agora-daemon", "run"]);
        let base = BridgeConfig {
            log_format: LogFormat::Json,
            log_level: "debug".to_string(),
            ..BridgeConfig::default()
        };

        let config = build_config(&cli, base);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn cli_log_flags_override_the_file() {
        let cli = Cli::parse_from([
            "agora-daemon",
            "--log-level",
            "trace",
            "--log-format",
            "human",
            "run",
        ]);
        let base = BridgeConfig {
            log_format: LogFormat::Json,
            log_level: "debug".to_string(),
            ..BridgeConfig::default()
        };

        let config = build_config(&cli, base);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn cli_network_overrides_the_file() {
        let cli = Cli::parse_from(["agora-daemon", "--network", "testnet", "run"]);
        let base = BridgeConfig::default();

        let config = build_config(&cli, base);
        assert_eq!(config.network, NetworkId::Testnet);
    }
}
