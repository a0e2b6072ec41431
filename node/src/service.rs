//! The bridge service — wires the store, chain reader, monitor, reconciler
//! and backup manager into one supervised unit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use agora_backup::BackupManager;
use agora_chain::HttpChainReader;
use agora_monitor::{GovernanceMonitor, VoteWidget};
use agora_reconciler::VoteReconciler;
use agora_store::BridgeStore;
use agora_store_json::JsonStore;
use agora_types::{ProposalId, ReconciledTally, ThreadRef, Timestamp, VoteChoice, VoteEvent, VoterId};

use crate::config::BridgeConfig;
use crate::error::NodeError;
use crate::publisher::{DisabledWidget, LoggingPublisher, LoggingWidget};
use crate::supervisor::{StopHandle, TaskSupervisor};

/// Capacity of the vote-event channel between the chat surface and the
/// reconciler. Bursts beyond this apply backpressure to the sender.
const VOTE_CHANNEL_CAPACITY: usize = 1024;

/// Timeout for draining background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// A running Agora bridge.
pub struct BridgeService {
    config: BridgeConfig,
    store: Arc<JsonStore>,
    chain: Arc<HttpChainReader>,
    monitor: Arc<GovernanceMonitor>,
    reconciler: Arc<VoteReconciler>,
    backup: Arc<BackupManager>,
    supervisor: TaskSupervisor,
    vote_tx: mpsc::Sender<VoteEvent>,
    vote_rx: Option<mpsc::Receiver<VoteEvent>>,
}

impl BridgeService {
    /// Open the store and wire all subsystems. Nothing runs until
    /// [`start`](Self::start).
    ///
    /// In read-only deployments the monitor still publishes discussion
    /// threads, but with the vote widget disabled, so no vote control ever
    /// appears on them.
    pub fn new(config: BridgeConfig) -> Result<Self, NodeError> {
        let store = Arc::new(JsonStore::open(&config.data_dir)?);
        let store_dyn: Arc<dyn BridgeStore> = store.clone();

        let chain = Arc::new(HttpChainReader::new(config.rpc_url(), config.explorer_url()));
        let widget: Arc<dyn VoteWidget> = if config.read_only {
            Arc::new(DisabledWidget)
        } else {
            Arc::new(LoggingWidget)
        };
        let monitor = Arc::new(
            GovernanceMonitor::new(
                store_dyn.clone(),
                chain.clone(),
                Arc::new(LoggingPublisher),
                widget,
                config.network.chain_id(),
            )
            .with_publish_retry_attempts(config.publish_retry_attempts),
        );
        let reconciler = Arc::new(VoteReconciler::new(store_dyn.clone()));
        let backup = Arc::new(BackupManager::new(
            store_dyn,
            &config.backup_dir,
            config.backup_retention,
        ));

        let (vote_tx, vote_rx) = mpsc::channel(VOTE_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            store,
            chain,
            monitor,
            reconciler,
            backup,
            supervisor: TaskSupervisor::new(),
            vote_tx,
            vote_rx: Some(vote_rx),
        })
    }

    /// Verify chain connectivity, spawn the poll loop, the vote-event
    /// consumer and the backup scheduler, then block until SIGINT/SIGTERM.
    pub async fn start(&mut self) -> Result<(), NodeError> {
        tracing::info!(
            network = self.config.network.as_str(),
            data_dir = %self.config.data_dir.display(),
            poll_interval_secs = self.config.poll_interval_secs,
            read_only = self.config.read_only,
            "bridge starting"
        );

        // A wrong or unreachable RPC endpoint must abort startup here,
        // before the first poll can write anything.
        self.chain
            .verify_chain_id(self.config.network.chain_id())
            .await?;

        // ── Governance poll loop ──────────────────────────────────────
        // The first tick fires immediately, so the cache is refreshed and
        // missing threads are republished at boot before the interval kicks in.
        {
            let monitor = Arc::clone(&self.monitor);
            let interval = Duration::from_secs(self.config.poll_interval_secs);
            let mut stop = self.supervisor.stop_signal();

            self.supervisor.supervise(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            match monitor.poll(Timestamp::now()).await {
                                Ok(events) => {
                                    tracing::info!(changes = events.len(), "governance poll complete");
                                }
                                Err(e) => {
                                    // The cache keeps serving the last good state.
                                    tracing::warn!(error = %e, "governance poll failed");
                                }
                            }
                        }
                        _ = stop.recv() => {
                            tracing::info!("poll loop stopped");
                            return;
                        }
                    }
                }
            }));
        }

        // ── Vote-event consumer ───────────────────────────────────────
        {
            let reconciler = Arc::clone(&self.reconciler);
            let vote_rx = self.vote_rx.take().ok_or(NodeError::AlreadyStarted)?;
            let stop = self.supervisor.stop_signal();

            self.supervisor.supervise(tokio::spawn(async move {
                reconciler.run(vote_rx, stop).await;
            }));
        }

        // ── Backup scheduler ──────────────────────────────────────────
        {
            let backup = Arc::clone(&self.backup);
            let interval = Duration::from_secs(self.config.backup_interval_secs);
            let stop = self.supervisor.stop_signal();

            self.supervisor.supervise(tokio::spawn(async move {
                backup.run(interval, stop).await;
            }));
        }

        tracing::info!("bridge started — all subsystems running");

        self.supervisor.wait_for_signal().await;

        Ok(())
    }

    /// Stop the bridge gracefully.
    ///
    /// Signals all tasks, then waits for them to drain queued votes and
    /// write the final backup (with a timeout).
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        tracing::info!("bridge stopping");
        self.supervisor.begin_stop();

        if !self.supervisor.join_all(SHUTDOWN_TIMEOUT).await {
            tracing::warn!(
                "shutdown timeout ({:?}) — some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
        }

        tracing::info!("bridge stopped");
        Ok(())
    }

    // ── Command surface ───────────────────────────────────────────────

    /// Queue a community vote for the reconciler.
    ///
    /// Rejected outright in read-only deployments; per-proposal rules
    /// (unknown id, closed proposal) are enforced by the reconciler when
    /// the event is consumed.
    pub async fn cast_vote(
        &self,
        proposal_id: ProposalId,
        voter: VoterId,
        choice: VoteChoice,
        cast_at: Timestamp,
    ) -> Result<(), NodeError> {
        if self.config.read_only {
            return Err(NodeError::ReadOnly);
        }
        let event = VoteEvent {
            proposal_id,
            voter,
            choice,
            cast_at,
        };
        self.vote_tx
            .send(event)
            .await
            .map_err(|_| NodeError::NotStarted)
    }

    /// Re-publish the discussion thread for a proposal on demand,
    /// bypassing the failure backoff.
    pub async fn refresh_thread(&self, proposal_id: ProposalId) -> Result<ThreadRef, NodeError> {
        Ok(self
            .monitor
            .ensure_thread_for(proposal_id, Timestamp::now())
            .await?)
    }

    /// Combined on-chain and community standing for a proposal.
    pub fn reconcile(&self, proposal_id: ProposalId) -> Result<ReconciledTally, NodeError> {
        Ok(self.reconciler.reconcile(proposal_id)?)
    }

    /// Sender half of the vote-event channel, for a chat integration that
    /// feeds voter actions in directly. Withheld in read-only deployments
    /// so no path around the read-only check exists.
    pub fn vote_sender(&self) -> Result<mpsc::Sender<VoteEvent>, NodeError> {
        if self.config.read_only {
            return Err(NodeError::ReadOnly);
        }
        Ok(self.vote_tx.clone())
    }

    /// Shared handle to the persistent store.
    pub fn store(&self) -> Arc<JsonStore> {
        Arc::clone(&self.store)
    }

    /// Handle that stops the bridge programmatically (e.g. from tests or
    /// an embedding application).
    pub fn stop_handle(&self) -> StopHandle {
        self.supervisor.stop_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &std::path::Path, read_only: bool) -> BridgeConfig {
        BridgeConfig {
            network: agora_types::NetworkId::Dev,
            data_dir: dir.join("data"),
            backup_dir: dir.join("backups"),
            read_only,
            ..BridgeConfig::default()
        }
    }

    #[tokio::test]
    async fn votes_are_rejected_in_read_only_mode() {
        let dir = tempfile::tempdir().unwrap();
        let service = BridgeService::new(test_config(dir.path(), true)).unwrap();

        let result = service
            .cast_vote(
                ProposalId::new(1),
                VoterId::new("u1"),
                VoteChoice::Aye,
                Timestamp::new(100),
            )
            .await;
        assert!(matches!(result, Err(NodeError::ReadOnly)));
    }

    #[tokio::test]
    async fn read_only_mode_withholds_the_vote_channel() {
        let dir = tempfile::tempdir().unwrap();

        let read_only = BridgeService::new(test_config(dir.path(), true)).unwrap();
        assert!(matches!(
            read_only.vote_sender(),
            Err(NodeError::ReadOnly)
        ));

        let writable = BridgeService::new(test_config(dir.path(), false)).unwrap();
        assert!(writable.vote_sender().is_ok());
    }

    #[tokio::test]
    async fn votes_are_queued_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let service = BridgeService::new(test_config(dir.path(), false)).unwrap();

        // The consumer is not running yet; the channel buffers the event.
        service
            .cast_vote(
                ProposalId::new(1),
                VoterId::new("u1"),
                VoteChoice::Aye,
                Timestamp::new(100),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reconcile_unknown_proposal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = BridgeService::new(test_config(dir.path(), false)).unwrap();

        let result = service.reconcile(ProposalId::new(404));
        assert!(matches!(result, Err(NodeError::Vote(_))));
    }

    #[tokio::test]
    async fn start_aborts_on_unreachable_rpc_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path(), false);
        // Discard port: connection refused, so the chain-id check fails
        // before any task is spawned.
        config.rpc_url = Some("http://127.0.0.1:9".into());

        let mut service = BridgeService::new(config).unwrap();
        assert!(matches!(
            service.start().await,
            Err(NodeError::Chain(_))
        ));
    }

    #[tokio::test]
    async fn store_survives_service_reconstruction() {
        use agora_store::{BridgeStore, Collection};

        let dir = tempfile::tempdir().unwrap();
        {
            let service = BridgeService::new(test_config(dir.path(), false)).unwrap();
            service
                .store()
                .put(Collection::Proposals, "1", serde_json::json!({"title": "p"}))
                .unwrap();
        }
        let service = BridgeService::new(test_config(dir.path(), false)).unwrap();
        assert!(service
            .store()
            .get(Collection::Proposals, "1")
            .unwrap()
            .is_some());
    }
}
