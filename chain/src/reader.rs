//! The abstract chain reader consumed by the governance monitor.

use async_trait::async_trait;

use agora_types::{ProposalId, ProposalStatus, Tally};

use crate::ChainError;

/// A governance proposal as reported by the chain for the current height.
///
/// This is the chain's view only; local bookkeeping (thread ref, first-seen
/// timestamps) is layered on by the monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainProposal {
    pub proposal_id: ProposalId,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub tally: Tally,
}

/// Read-only access to governance state on the chain.
///
/// Implementations must be idempotent: two calls without an intervening
/// chain state change return the same data. The returned set is
/// "active at this height", not exhaustive history — proposals missing
/// from a response are not treated as deleted.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current set of governance proposals for the given chain.
    async fn list_proposals(&self, chain_id: u64) -> Result<Vec<ChainProposal>, ChainError>;

    /// Latest on-chain tally for a single proposal.
    async fn get_tally(&self, proposal_id: ProposalId) -> Result<Tally, ChainError>;
}
