//! Fundamental types for the Agora governance bridge.
//!
//! Everything that crosses a crate boundary lives here: proposal and voter
//! identities, lifecycle statuses, tallies, the persisted record shapes and
//! the network presets for the supported chains.

pub mod ids;
pub mod network;
pub mod proposal;
pub mod tally;
pub mod time;
pub mod vote;

pub use ids::{ProposalId, ThreadRef, VoterId};
pub use network::NetworkId;
pub use proposal::{OnChainRecord, Proposal, ProposalStatus};
pub use tally::{CommunityCounts, Tally};
pub use time::Timestamp;
pub use vote::{CommunityVote, DisplayStatus, ReconciledTally, VoteChoice, VoteEvent, VoteLedger};
