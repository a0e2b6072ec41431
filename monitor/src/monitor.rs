//! The poll/diff engine.

use std::sync::{Arc, Mutex};

use agora_chain::{ChainProposal, ChainReader};
use agora_store::{BridgeStore, BridgeStoreExt, Collection};
use agora_types::{OnChainRecord, Proposal, ProposalId, ThreadRef, Timestamp, VoteChoice};

use crate::{
    MonitorError, ProposalChangeEvent, PublishError, RetryTracker, ThreadPublisher, VoteWidget,
};

/// Polls the chain, mirrors proposals into the store and publishes
/// discussion threads.
///
/// Proposals are created here on first observation and never deleted; a
/// proposal missing from a chain response is left untouched, because the
/// response is "active at this height", not exhaustive history.
pub struct GovernanceMonitor {
    store: Arc<dyn BridgeStore>,
    chain: Arc<dyn ChainReader>,
    publisher: Arc<dyn ThreadPublisher>,
    widget: Arc<dyn VoteWidget>,
    chain_id: u64,
    retries: Mutex<RetryTracker>,
}

impl GovernanceMonitor {
    pub fn new(
        store: Arc<dyn BridgeStore>,
        chain: Arc<dyn ChainReader>,
        publisher: Arc<dyn ThreadPublisher>,
        widget: Arc<dyn VoteWidget>,
        chain_id: u64,
    ) -> Self {
        Self {
            store,
            chain,
            publisher,
            widget,
            chain_id,
            retries: Mutex::new(RetryTracker::new()),
        }
    }

    /// Override the publish retry budget (defaults to the tracker's cap).
    pub fn with_publish_retry_attempts(mut self, max_attempts: u32) -> Self {
        self.retries = Mutex::new(RetryTracker::with_max_attempts(max_attempts));
        self
    }

    /// One poll cycle: fetch, diff, persist, publish.
    ///
    /// A chain read failure skips the whole cycle with the cache untouched.
    /// Publish failures are isolated per proposal and retried on later
    /// cycles. Polling twice with identical chain data emits zero events
    /// and performs no store mutation.
    pub async fn poll(&self, now: Timestamp) -> Result<Vec<ProposalChangeEvent>, MonitorError> {
        let chain_proposals = self.chain.list_proposals(self.chain_id).await?;
        tracing::debug!(count = chain_proposals.len(), "poll: chain proposals fetched");

        let mut events = Vec::new();
        for chain_proposal in &chain_proposals {
            if let Some(event) = self.apply_chain_proposal(chain_proposal, now)? {
                match &event {
                    ProposalChangeEvent::Created { proposal_id } => {
                        tracing::info!(proposal = %proposal_id, "new proposal observed");
                    }
                    ProposalChangeEvent::Updated { proposal_id, status } => {
                        tracing::info!(proposal = %proposal_id, ?status, "proposal changed");
                    }
                }
                events.push(event);
            }
        }

        self.publish_pending(now).await?;
        Ok(events)
    }

    /// On-demand refresh for one proposal: re-ensure its thread and widget,
    /// ignoring any spent retry budget. Backs the "create/refresh thread
    /// for proposal X" command.
    pub async fn ensure_thread_for(
        &self,
        proposal_id: ProposalId,
        _now: Timestamp,
    ) -> Result<ThreadRef, MonitorError> {
        let key = proposal_id.as_key();
        let proposal: Proposal = self
            .store
            .get_typed(Collection::Proposals, &key)?
            .ok_or(MonitorError::UnknownProposal(proposal_id))?;

        self.retries
            .lock()
            .expect("retry tracker poisoned")
            .reset(proposal_id);

        let thread = self
            .publish(&proposal)
            .await
            .map_err(MonitorError::Publish)?;
        self.set_thread_ref(proposal_id, &thread)?;
        Ok(thread)
    }

    /// Diff one chain proposal against the cache under the per-key lock.
    fn apply_chain_proposal(
        &self,
        chain_proposal: &ChainProposal,
        now: Timestamp,
    ) -> Result<Option<ProposalChangeEvent>, MonitorError> {
        let proposal_id = chain_proposal.proposal_id;
        let key = proposal_id.as_key();

        let mut change: Option<ProposalChangeEvent> = None;
        self.store
            .update_typed::<Proposal, _>(Collection::Proposals, &key, |current| match current {
                None => {
                    change = Some(ProposalChangeEvent::Created { proposal_id });
                    Some(Proposal {
                        proposal_id,
                        title: chain_proposal.title.clone(),
                        description: chain_proposal.description.clone(),
                        status: chain_proposal.status,
                        on_chain_tally: chain_proposal.tally,
                        thread_ref: None,
                        first_seen_at: now,
                        last_updated_at: now,
                    })
                }
                Some(mut cached) => {
                    if cached.status != chain_proposal.status
                        || cached.on_chain_tally != chain_proposal.tally
                    {
                        change = Some(ProposalChangeEvent::Updated {
                            proposal_id,
                            status: chain_proposal.status,
                        });
                        cached.status = chain_proposal.status;
                        cached.on_chain_tally = chain_proposal.tally;
                        cached.last_updated_at = now;
                    }
                    Some(cached)
                }
            })?;

        // Mirror the chain's view into the on-chain vote records whenever
        // it changed.
        if change.is_some() {
            self.store.put_typed(
                Collection::OnChainVotes,
                &key,
                &OnChainRecord {
                    proposal_id,
                    status: chain_proposal.status,
                    tally: chain_proposal.tally,
                    recorded_at: now,
                },
            )?;
        }
        Ok(change)
    }

    /// Publish threads for every cached proposal still missing one.
    async fn publish_pending(&self, now: Timestamp) -> Result<(), MonitorError> {
        for (key, value) in self.store.list(Collection::Proposals)? {
            let proposal: Proposal = match serde_json::from_value(value) {
                Ok(proposal) => proposal,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping undecodable proposal record");
                    continue;
                }
            };
            if proposal.thread_ref.is_some() {
                continue;
            }

            let proposal_id = proposal.proposal_id;
            {
                let retries = self.retries.lock().expect("retry tracker poisoned");
                if retries.is_exhausted(proposal_id) {
                    tracing::error!(
                        proposal = %proposal_id,
                        "publish retry budget spent, leaving proposal threadless"
                    );
                    continue;
                }
                if !retries.is_due(proposal_id, now) {
                    continue;
                }
            }

            match self.publish(&proposal).await {
                Ok(thread) => {
                    self.set_thread_ref(proposal_id, &thread)?;
                    self.retries
                        .lock()
                        .expect("retry tracker poisoned")
                        .record_success(proposal_id);
                    tracing::info!(proposal = %proposal_id, thread = %thread, "thread published");
                }
                Err(e) => {
                    // Isolated: the remaining proposals still get their turn.
                    self.retries
                        .lock()
                        .expect("retry tracker poisoned")
                        .record_failure(proposal_id, now);
                    tracing::warn!(proposal = %proposal_id, error = %e, "thread publish failed");
                }
            }
        }
        Ok(())
    }

    /// Thread first, widget second; the thread ref is only persisted once
    /// both succeed, so a half-published proposal is retried whole.
    async fn publish(&self, proposal: &Proposal) -> Result<ThreadRef, PublishError> {
        let thread = self.publisher.ensure_thread(proposal).await?;
        self.widget
            .render(&thread, proposal.proposal_id, &VoteChoice::ALL)
            .await?;
        Ok(thread)
    }

    fn set_thread_ref(
        &self,
        proposal_id: ProposalId,
        thread: &ThreadRef,
    ) -> Result<(), MonitorError> {
        let key = proposal_id.as_key();
        self.store
            .update_typed::<Proposal, _>(Collection::Proposals, &key, |current| {
                current.map(|mut proposal| {
                    proposal.thread_ref = Some(thread.clone());
                    proposal
                })
            })?;
        Ok(())
    }
}
