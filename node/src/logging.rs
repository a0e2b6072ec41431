//! Log output configuration for the bridge process.
//!
//! The format is part of [`BridgeConfig`](crate::BridgeConfig), so it can
//! come from the TOML file, the CLI or an env var like every other setting.
//! The filter level can still be overridden at runtime via `RUST_LOG`; when
//! it is not set, the configured level string is used (e.g. `"info"`,
//! `"debug,agora_monitor=trace"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for bridge logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines for local development.
    #[default]
    Human,
    /// Newline-delimited JSON for log aggregation pipelines.
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format {other:?}, expected \"human\" or \"json\""
            )),
        }
    }
}

/// Install the global tracing subscriber for the bridge process.
///
/// Call once, after the merged configuration is known, so the file's log
/// settings take effect when no CLI flag overrides them.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Human => {
            registry
                .with(fmt_layer::layer().compact().with_target(true))
                .init();
        }
        LogFormat::Json => {
            registry
                .with(fmt_layer::layer().json().flatten_event(true))
                .init();
        }
    }
}
