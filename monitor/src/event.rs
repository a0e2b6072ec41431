//! Change events emitted by a poll cycle.

use agora_types::{ProposalId, ProposalStatus};

/// What a poll cycle observed for one proposal. Polling twice with
/// identical chain data emits no events at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalChangeEvent {
    /// First observation of this proposal.
    Created { proposal_id: ProposalId },
    /// Status or tally changed since the cached copy.
    Updated {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },
}

impl ProposalChangeEvent {
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            Self::Created { proposal_id } | Self::Updated { proposal_id, .. } => *proposal_id,
        }
    }
}
