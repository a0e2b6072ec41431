//! Governance proposals mirrored from the chain.

use serde::{Deserialize, Serialize};

use crate::{ProposalId, Tally, ThreadRef, Timestamp};

/// Lifecycle status of a proposal as reported by the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Submitted but not yet open for on-chain voting.
    Pending,
    /// Open for on-chain voting.
    Active,
    /// Accepted on-chain, awaiting execution.
    Passed,
    /// Rejected on-chain.
    Rejected,
    /// Accepted and executed on-chain.
    Executed,
    /// Closed because the chain-side quorum was not met.
    NoQuorum,
    /// Status label the bridge could not interpret.
    Unknown,
}

impl ProposalStatus {
    /// Whether this status is terminal. Terminal proposals never reopen;
    /// the on-chain result is authoritative over community sentiment.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Rejected | Self::Executed | Self::NoQuorum
        )
    }
}

/// A governance proposal as cached locally.
///
/// Created only by the Governance Monitor on first observation from the
/// chain and never deleted, only transitioned to terminal statuses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Chain-assigned identifier.
    pub proposal_id: ProposalId,
    /// Display title.
    pub title: String,
    /// Display body.
    pub description: String,
    /// Latest lifecycle status reported by the chain.
    pub status: ProposalStatus,
    /// Latest on-chain vote weights.
    pub on_chain_tally: Tally,
    /// Discussion thread on the chat platform, once published.
    pub thread_ref: Option<ThreadRef>,
    /// When the monitor first observed this proposal.
    pub first_seen_at: Timestamp,
    /// When any chain-reported field last changed.
    pub last_updated_at: Timestamp,
}

/// Latest observed on-chain vote record for a proposal.
///
/// One record per proposal, overwritten on every observed change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainRecord {
    pub proposal_id: ProposalId,
    pub status: ProposalStatus,
    pub tally: Tally,
    pub recorded_at: Timestamp,
}
