//! Vote recording and tally reconciliation.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use agora_store::{BridgeStore, BridgeStoreExt, Collection};
use agora_types::{
    CommunityVote, DisplayStatus, Proposal, ProposalId, ProposalStatus, ReconciledTally,
    Timestamp, VoteChoice, VoteEvent, VoteLedger, VoterId,
};

use crate::VoteError;

/// Maintains per-proposal community vote ledgers and derives the displayed
/// status from the authoritative chain state.
pub struct VoteReconciler {
    store: Arc<dyn BridgeStore>,
}

impl VoteReconciler {
    pub fn new(store: Arc<dyn BridgeStore>) -> Self {
        Self { store }
    }

    /// Record or replace a voter's choice on a proposal.
    ///
    /// At most one active vote per (proposal, voter): a newer `cast_at`
    /// overwrites the prior choice, an older one is ignored. Events are
    /// assumed causally ordered per voter; ordering across voters does not
    /// matter since the ledger is voter-keyed.
    pub fn record_vote(
        &self,
        proposal_id: ProposalId,
        voter: &VoterId,
        choice: VoteChoice,
        cast_at: Timestamp,
    ) -> Result<(), VoteError> {
        let proposal = self.cached_proposal(proposal_id)?;
        if proposal.status.is_terminal() {
            return Err(VoteError::ProposalClosed(proposal_id));
        }

        let key = proposal_id.as_key();
        self.store
            .update_typed::<VoteLedger, _>(Collection::CommunityVotes, &key, |current| {
                let mut ledger = current.unwrap_or_else(|| VoteLedger::new(proposal_id));
                match ledger.voters.get(voter) {
                    // Stale duplicate: an earlier-timestamped arrival never
                    // overrides a later vote.
                    Some(existing) if existing.cast_at > cast_at => {}
                    _ => {
                        ledger
                            .voters
                            .insert(voter.clone(), CommunityVote { choice, cast_at });
                    }
                }
                Some(ledger)
            })?;
        tracing::debug!(proposal = %proposal_id, voter = %voter, %choice, "vote recorded");
        Ok(())
    }

    /// Recompute the reconciled view for one proposal.
    ///
    /// Community counts and the on-chain tally are reported side by side,
    /// never merged: the chain outcome is authoritative and community
    /// sentiment can never flip a terminal result.
    pub fn reconcile(&self, proposal_id: ProposalId) -> Result<ReconciledTally, VoteError> {
        let proposal = self.cached_proposal(proposal_id)?;
        let ledger: Option<VoteLedger> = self
            .store
            .get_typed(Collection::CommunityVotes, &proposal_id.as_key())?;
        let community_counts = ledger.map(|l| l.counts()).unwrap_or_default();

        Ok(ReconciledTally {
            proposal_id,
            community_counts,
            on_chain_tally: proposal.on_chain_tally,
            display_status: display_status(proposal.status),
        })
    }

    /// Consume vote events from the widget channel until shutdown.
    ///
    /// Rejections are logged and dropped (the widget already answered the
    /// voter); store failures are logged at error level because the vote
    /// was not applied. On shutdown, events already queued are drained so
    /// no accepted vote is lost.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<VoteEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    while let Ok(event) = events.try_recv() {
                        self.handle_event(event);
                    }
                    tracing::info!("vote reconciler stopped");
                    return;
                }
                maybe_event = events.recv() => match maybe_event {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::info!("vote channel closed, reconciler stopping");
                        return;
                    }
                },
            }
        }
    }

    fn handle_event(&self, event: VoteEvent) {
        match self.record_vote(event.proposal_id, &event.voter, event.choice, event.cast_at) {
            Ok(()) => {}
            Err(e @ (VoteError::UnknownProposal(_) | VoteError::ProposalClosed(_))) => {
                tracing::warn!(voter = %event.voter, error = %e, "vote rejected");
            }
            Err(e @ VoteError::Store(_)) => {
                tracing::error!(voter = %event.voter, error = %e, "vote lost to store failure");
            }
        }
    }

    fn cached_proposal(&self, proposal_id: ProposalId) -> Result<Proposal, VoteError> {
        self.store
            .get_typed(Collection::Proposals, &proposal_id.as_key())?
            .ok_or(VoteError::UnknownProposal(proposal_id))
    }
}

fn display_status(status: ProposalStatus) -> DisplayStatus {
    match status {
        ProposalStatus::Passed | ProposalStatus::Executed => DisplayStatus::ClosedPassed,
        ProposalStatus::Rejected => DisplayStatus::ClosedRejected,
        ProposalStatus::NoQuorum => DisplayStatus::ClosedNoQuorum,
        // An unreadable status must not fabricate a closed outcome.
        ProposalStatus::Pending | ProposalStatus::Active | ProposalStatus::Unknown => {
            DisplayStatus::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryStore;
    use agora_types::Tally;

    fn pid(n: u64) -> ProposalId {
        ProposalId::new(n)
    }

    fn seed_proposal(store: &MemoryStore, id: u64, status: ProposalStatus, tally: Tally) {
        let proposal = Proposal {
            proposal_id: pid(id),
            title: format!("Proposal {id}"),
            description: String::new(),
            status,
            on_chain_tally: tally,
            thread_ref: None,
            first_seen_at: Timestamp::new(0),
            last_updated_at: Timestamp::new(0),
        };
        store
            .put_typed(Collection::Proposals, &pid(id).as_key(), &proposal)
            .unwrap();
    }

    fn setup(status: ProposalStatus, tally: Tally) -> (Arc<MemoryStore>, VoteReconciler) {
        let store = Arc::new(MemoryStore::new());
        seed_proposal(&store, 1, status, tally);
        let reconciler = VoteReconciler::new(store.clone());
        (store, reconciler)
    }

    #[test]
    fn unknown_proposal_rejected_without_mutation() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = VoteReconciler::new(store.clone());

        let result = reconciler.record_vote(
            pid(9),
            &VoterId::new("u1"),
            VoteChoice::Aye,
            Timestamp::new(10),
        );
        assert!(matches!(result, Err(VoteError::UnknownProposal(_))));
        assert!(store.list(Collection::CommunityVotes).unwrap().is_empty());
        assert!(store.list(Collection::OnChainVotes).unwrap().is_empty());
    }

    #[test]
    fn last_writer_wins_per_voter() {
        let (_store, reconciler) = setup(ProposalStatus::Active, Tally::default());
        let voter = VoterId::new("u1");

        reconciler
            .record_vote(pid(1), &voter, VoteChoice::Aye, Timestamp::new(10))
            .unwrap();
        reconciler
            .record_vote(pid(1), &voter, VoteChoice::Nay, Timestamp::new(20))
            .unwrap();

        let tally = reconciler.reconcile(pid(1)).unwrap();
        assert_eq!(tally.community_counts.aye, 0);
        assert_eq!(tally.community_counts.nay, 1);
        assert_eq!(tally.community_counts.total(), 1);
    }

    #[test]
    fn stale_timestamped_vote_does_not_override() {
        let (_store, reconciler) = setup(ProposalStatus::Active, Tally::default());
        let voter = VoterId::new("u1");

        reconciler
            .record_vote(pid(1), &voter, VoteChoice::Nay, Timestamp::new(20))
            .unwrap();
        // Late arrival with an earlier timestamp: ignored.
        reconciler
            .record_vote(pid(1), &voter, VoteChoice::Aye, Timestamp::new(10))
            .unwrap();

        let tally = reconciler.reconcile(pid(1)).unwrap();
        assert_eq!(tally.community_counts.nay, 1);
        assert_eq!(tally.community_counts.aye, 0);
    }

    #[test]
    fn terminal_proposal_rejects_votes() {
        let (store, reconciler) = setup(ProposalStatus::Passed, Tally::default());

        let result = reconciler.record_vote(
            pid(1),
            &VoterId::new("u1"),
            VoteChoice::Nay,
            Timestamp::new(10),
        );
        assert!(matches!(result, Err(VoteError::ProposalClosed(_))));
        assert!(store.list(Collection::CommunityVotes).unwrap().is_empty());
    }

    #[test]
    fn onchain_result_is_authoritative_over_sentiment() {
        let (store, reconciler) = setup(ProposalStatus::Active, Tally::new(10, 500, 0));

        // A flood of community AYEs while the proposal is open...
        for i in 0..50 {
            reconciler
                .record_vote(
                    pid(1),
                    &VoterId::new(format!("u{i}")),
                    VoteChoice::Aye,
                    Timestamp::new(i),
                )
                .unwrap();
        }
        assert_eq!(
            reconciler.reconcile(pid(1)).unwrap().display_status,
            DisplayStatus::Open
        );

        // ...does not move the displayed outcome once the chain rejects it.
        seed_proposal(&store, 1, ProposalStatus::Rejected, Tally::new(10, 500, 0));
        let tally = reconciler.reconcile(pid(1)).unwrap();
        assert_eq!(tally.display_status, DisplayStatus::ClosedRejected);
        assert_eq!(tally.community_counts.aye, 50);
    }

    #[test]
    fn no_quorum_only_when_chain_reports_it() {
        let (store, reconciler) = setup(ProposalStatus::Active, Tally::default());
        // Zero community participation never implies NoQuorum.
        assert_eq!(
            reconciler.reconcile(pid(1)).unwrap().display_status,
            DisplayStatus::Open
        );

        seed_proposal(&store, 1, ProposalStatus::NoQuorum, Tally::default());
        assert_eq!(
            reconciler.reconcile(pid(1)).unwrap().display_status,
            DisplayStatus::ClosedNoQuorum
        );
    }

    #[test]
    fn unknown_status_displays_open() {
        let (_store, reconciler) = setup(ProposalStatus::Unknown, Tally::default());
        assert_eq!(
            reconciler.reconcile(pid(1)).unwrap().display_status,
            DisplayStatus::Open
        );
    }

    #[test]
    fn spec_scenario_two_voters_one_change() {
        let (_store, reconciler) = setup(ProposalStatus::Active, Tally::new(100, 20, 0));

        reconciler
            .record_vote(pid(1), &VoterId::new("u1"), VoteChoice::Aye, Timestamp::new(1))
            .unwrap();
        reconciler
            .record_vote(pid(1), &VoterId::new("u2"), VoteChoice::Nay, Timestamp::new(2))
            .unwrap();
        reconciler
            .record_vote(pid(1), &VoterId::new("u2"), VoteChoice::Recuse, Timestamp::new(3))
            .unwrap();

        let tally = reconciler.reconcile(pid(1)).unwrap();
        assert_eq!(tally.community_counts.aye, 1);
        assert_eq!(tally.community_counts.nay, 0);
        assert_eq!(tally.community_counts.recuse, 1);
        assert_eq!(tally.on_chain_tally, Tally::new(100, 20, 0));
        assert_eq!(tally.display_status, DisplayStatus::Open);
    }

    #[tokio::test]
    async fn channel_consumer_applies_events_and_drains_on_shutdown() {
        let (store, reconciler) = setup(ProposalStatus::Active, Tally::default());
        let reconciler = Arc::new(reconciler);

        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        for i in 0..3 {
            tx.send(VoteEvent {
                proposal_id: pid(1),
                voter: VoterId::new(format!("u{i}")),
                choice: VoteChoice::Aye,
                cast_at: Timestamp::new(i),
            })
            .await
            .unwrap();
        }

        let consumer = {
            let reconciler = Arc::clone(&reconciler);
            tokio::spawn(async move { reconciler.run(rx, shutdown_rx).await })
        };

        // Give the consumer a chance to pick events up, then stop it.
        tokio::task::yield_now().await;
        shutdown_tx.send(()).unwrap();
        consumer.await.unwrap();

        let ledger: VoteLedger = store
            .get_typed(Collection::CommunityVotes, "1")
            .unwrap()
            .unwrap();
        assert_eq!(ledger.voters.len(), 3);
    }
}
