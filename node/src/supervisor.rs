//! Supervision of the bridge's background tasks.
//!
//! The poll loop, the vote-event consumer and the backup scheduler run as
//! tokio tasks that watch a shared stop channel. The supervisor owns their
//! join handles, relays SIGINT/SIGTERM into the stop channel and joins
//! everything on the way down, so queued votes are drained and the final
//! backup is written before the process exits.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Cloneable handle that stops the bridge from outside the service,
/// e.g. from an embedding application or a test.
#[derive(Clone)]
pub struct StopHandle {
    tx: broadcast::Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(());
    }
}

/// Tracks the bridge's background tasks and coordinates their shutdown.
///
/// Each task takes a [`stop_signal`](Self::stop_signal) receiver and
/// `select!`s on it alongside its main loop; the spawned handle is handed
/// back via [`supervise`](Self::supervise) so [`join_all`](Self::join_all)
/// can wait for the task to finish its drain work.
pub struct TaskSupervisor {
    stop_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            stop_tx,
            handles: Vec::new(),
        }
    }

    /// Stop-channel receiver for a task's `select!` loop.
    pub fn stop_signal(&self) -> broadcast::Receiver<()> {
        self.stop_tx.subscribe()
    }

    /// External stop control.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Track a spawned task for the shutdown join.
    pub fn supervise(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// Signal every supervised task to stop and start draining.
    pub fn begin_stop(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Block until SIGINT or SIGTERM, then signal the tasks.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, stopping bridge"); }
            _ = terminate => { tracing::info!("received SIGTERM, stopping bridge"); }
        }

        self.begin_stop();
    }

    /// Wait for every supervised task to finish, up to `timeout`.
    ///
    /// Returns `false` if some tasks were still running when the timeout
    /// expired; their drain work (queued votes, the shutdown backup) may be
    /// incomplete.
    pub async fn join_all(&mut self, timeout: Duration) -> bool {
        let handles: Vec<JoinHandle<()>> = self.handles.drain(..).collect();
        let drain = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        tokio::time::timeout(timeout, drain).await.is_ok()
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
