//! Community votes and the reconciled view derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{CommunityCounts, ProposalId, Tally, Timestamp, VoterId};

/// The three-way vote choice offered on every proposal thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Aye,
    Nay,
    Recuse,
}

impl VoteChoice {
    /// All choices, in the order they are rendered on the widget.
    pub const ALL: [VoteChoice; 3] = [Self::Aye, Self::Nay, Self::Recuse];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aye => "aye",
            Self::Nay => "nay",
            Self::Recuse => "recuse",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single voter's current choice on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityVote {
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
}

/// All community votes on one proposal, keyed by voter.
///
/// At most one active vote per voter; a newer vote from the same voter
/// overwrites the prior choice (last-writer-wins by `cast_at`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    pub proposal_id: ProposalId,
    pub voters: BTreeMap<VoterId, CommunityVote>,
}

impl VoteLedger {
    pub fn new(proposal_id: ProposalId) -> Self {
        Self {
            proposal_id,
            voters: BTreeMap::new(),
        }
    }

    /// Count current votes per choice.
    pub fn counts(&self) -> CommunityCounts {
        let mut counts = CommunityCounts::default();
        for vote in self.voters.values() {
            match vote.choice {
                VoteChoice::Aye => counts.aye += 1,
                VoteChoice::Nay => counts.nay += 1,
                VoteChoice::Recuse => counts.recuse += 1,
            }
        }
        counts
    }
}

/// A vote action reported by the chat-platform vote widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub proposal_id: ProposalId,
    pub voter: VoterId,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
}

/// Status shown on the discussion surface after reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Open,
    ClosedPassed,
    ClosedRejected,
    ClosedNoQuorum,
}

/// Derived per-proposal view: community sentiment next to the on-chain
/// tally. Recomputed on every reconciliation pass, never mutated directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledTally {
    pub proposal_id: ProposalId,
    pub community_counts: CommunityCounts,
    pub on_chain_tally: Tally,
    pub display_status: DisplayStatus,
}
