//! Stand-in chat-platform adapters.
//!
//! The daemon ships without a concrete chat integration; these adapters
//! satisfy the publisher interfaces by logging what a real integration
//! would post. Thread refs are derived deterministically from the proposal
//! id so re-publishing after a crash yields the same ref.

use async_trait::async_trait;

use agora_monitor::{PublishError, ThreadPublisher, VoteWidget};
use agora_types::{Proposal, ProposalId, ThreadRef, VoteChoice};

/// Logs thread creation instead of calling a chat platform.
pub struct LoggingPublisher;

#[async_trait]
impl ThreadPublisher for LoggingPublisher {
    async fn ensure_thread(&self, proposal: &Proposal) -> Result<ThreadRef, PublishError> {
        let thread = ThreadRef::new(format!("local/{}", proposal.proposal_id.as_u64()));
        tracing::info!(
            proposal = %proposal.proposal_id,
            thread = %thread,
            title = %proposal.title,
            "thread ensured"
        );
        Ok(thread)
    }
}

/// Logs widget rendering instead of posting vote controls.
pub struct LoggingWidget;

#[async_trait]
impl VoteWidget for LoggingWidget {
    async fn render(
        &self,
        thread: &ThreadRef,
        proposal_id: ProposalId,
        choices: &[VoteChoice],
    ) -> Result<(), PublishError> {
        let labels: Vec<&str> = choices.iter().map(|c| c.as_str()).collect();
        tracing::info!(
            proposal = %proposal_id,
            thread = %thread,
            choices = labels.join("/"),
            "vote widget rendered"
        );
        Ok(())
    }
}

/// Widget for read-only deployments: threads are still published, but no
/// vote control is attached and community voting stays closed.
pub struct DisabledWidget;

#[async_trait]
impl VoteWidget for DisabledWidget {
    async fn render(
        &self,
        thread: &ThreadRef,
        proposal_id: ProposalId,
        _choices: &[VoteChoice],
    ) -> Result<(), PublishError> {
        tracing::debug!(
            proposal = %proposal_id,
            thread = %thread,
            "read-only: thread published without vote controls"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{ProposalStatus, Tally, Timestamp};

    fn proposal(id: u64) -> Proposal {
        Proposal {
            proposal_id: ProposalId::new(id),
            title: format!("Proposal #{id}"),
            description: String::new(),
            status: ProposalStatus::Active,
            on_chain_tally: Tally::default(),
            thread_ref: None,
            first_seen_at: Timestamp::new(1),
            last_updated_at: Timestamp::new(1),
        }
    }

    #[tokio::test]
    async fn thread_refs_are_deterministic() {
        let publisher = LoggingPublisher;
        let a = publisher.ensure_thread(&proposal(7)).await.unwrap();
        let b = publisher.ensure_thread(&proposal(7)).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn disabled_widget_never_blocks_thread_publication() {
        let widget = DisabledWidget;
        let thread = ThreadRef::new("local/9");
        assert!(widget
            .render(&thread, ProposalId::new(9), VoteChoice::ALL.as_slice())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn widget_render_succeeds() {
        let widget = LoggingWidget;
        let thread = ThreadRef::new("local/7");
        assert!(widget
            .render(&thread, ProposalId::new(7), VoteChoice::ALL.as_slice())
            .await
            .is_ok());
    }
}
