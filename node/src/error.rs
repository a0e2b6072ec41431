use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] agora_store::StoreError),

    #[error("chain error: {0}")]
    Chain(#[from] agora_chain::ChainError),

    #[error("monitor error: {0}")]
    Monitor(#[from] agora_monitor::MonitorError),

    #[error("vote error: {0}")]
    Vote(#[from] agora_reconciler::VoteError),

    #[error("backup error: {0}")]
    Backup(#[from] agora_backup::BackupError),

    #[error("config error: {0}")]
    Config(String),

    #[error("service is read-only")]
    ReadOnly,

    #[error("service not started")]
    NotStarted,

    #[error("service already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
