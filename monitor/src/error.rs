use thiserror::Error;

use agora_types::ProposalId;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Chain reader unavailable: the whole poll cycle is skipped with the
    /// cache untouched, and the next scheduled poll retries.
    #[error("chain read failed: {0}")]
    ChainRead(#[from] agora_chain::ChainError),

    #[error("store error: {0}")]
    Store(#[from] agora_store::StoreError),

    /// On-demand refresh for a proposal that was never observed on chain.
    #[error("proposal {0} not in cache")]
    UnknownProposal(ProposalId),

    /// Surfaced only by the on-demand refresh; poll-cycle publish failures
    /// are retried internally instead.
    #[error("publish failed: {0}")]
    Publish(#[from] crate::PublishError),
}
