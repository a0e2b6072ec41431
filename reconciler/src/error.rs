use thiserror::Error;

use agora_types::ProposalId;

#[derive(Debug, Error)]
pub enum VoteError {
    /// The vote references a proposal the monitor has never cached.
    /// Rejected with no state mutation.
    #[error("proposal {0} not in cache")]
    UnknownProposal(ProposalId),

    /// The proposal already reached a terminal on-chain status. Rejected so
    /// the caller can tell the voter instead of silently dropping the vote.
    #[error("proposal {0} is closed to community voting")]
    ProposalClosed(ProposalId),

    /// The vote was NOT applied; the caller must not report success.
    #[error("store error: {0}")]
    Store(#[from] agora_store::StoreError),
}
