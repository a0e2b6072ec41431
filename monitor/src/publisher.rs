//! Collaborator interfaces on the chat-platform side.
//!
//! The bridge core never talks to the chat platform directly; it calls
//! these traits and leaves transport, rendering and authorization to the
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

use agora_types::{Proposal, ProposalId, ThreadRef, VoteChoice};

#[derive(Debug, Error)]
pub enum PublishError {
    /// Transport or gateway failure. Retryable on a later poll cycle.
    #[error("publish transport error: {0}")]
    Transport(String),

    /// The platform refused the request (auth, rate limit, bad channel).
    #[error("publish rejected: {0}")]
    Rejected(String),
}

/// Ensures a discussion thread exists for a proposal.
///
/// Must be idempotent: calling it again for a proposal that already has a
/// thread returns the existing thread ref instead of creating a duplicate.
/// The monitor relies on this to retry safely after a crash mid-cycle.
#[async_trait]
pub trait ThreadPublisher: Send + Sync {
    async fn ensure_thread(&self, proposal: &Proposal) -> Result<ThreadRef, PublishError>;
}

/// Renders the three-way vote control on a thread.
///
/// Voter actions come back to the core as [`agora_types::VoteEvent`]s on a
/// channel; this trait only covers the outbound registration.
#[async_trait]
pub trait VoteWidget: Send + Sync {
    async fn render(
        &self,
        thread: &ThreadRef,
        proposal_id: ProposalId,
        choices: &[VoteChoice],
    ) -> Result<(), PublishError>;
}
