use thiserror::Error;

/// Always non-fatal: callers log these and move on.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] agora_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
