//! Snapshot scheduling and retention.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use agora_store::{BridgeStore, Snapshot};
use agora_types::Timestamp;

use crate::BackupError;

/// Default number of snapshot files to retain.
pub const DEFAULT_RETENTION: usize = 5;

/// Writes timestamped snapshot files and prunes old ones.
pub struct BackupManager {
    store: Arc<dyn BridgeStore>,
    backup_dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(store: Arc<dyn BridgeStore>, backup_dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            store,
            backup_dir: backup_dir.into(),
            retention: retention.max(1),
        }
    }

    /// Take one snapshot now. Returns the written file path.
    pub fn run_once(&self, now: Timestamp) -> Result<PathBuf, BackupError> {
        fs::create_dir_all(&self.backup_dir)?;
        let snapshot = self.store.snapshot()?;
        let path = self
            .backup_dir
            .join(format!("snapshot_{:020}.json", now.as_secs()));
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        fs::write(&path, bytes)?;
        self.prune()?;
        tracing::info!(path = %path.display(), entries = snapshot.len(), "backup written");
        Ok(path)
    }

    /// Read a snapshot file back, e.g. for store recovery.
    pub fn load_snapshot(path: &Path) -> Result<Snapshot, BackupError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Snapshot on `interval` until shutdown, then take one final snapshot.
    ///
    /// Runs after the store's pending updates by construction: every store
    /// mutation is synchronous and durable, so whatever `snapshot()` sees
    /// is already on disk.
    pub async fn run(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        // The immediate first tick would duplicate the state loaded at boot.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_logged(Timestamp::now()),
                _ = shutdown.recv() => {
                    self.run_logged(Timestamp::now());
                    tracing::info!("backup manager stopped");
                    return;
                }
            }
        }
    }

    fn run_logged(&self, now: Timestamp) {
        if let Err(e) = self.run_once(now) {
            // Never fatal, never blocks the monitor or reconciler.
            tracing::warn!(error = %e, "backup failed");
        }
    }

    /// Delete the oldest snapshots beyond the retention count. File names
    /// embed a zero-padded timestamp, so lexicographic order is age order.
    fn prune(&self) -> Result<(), BackupError> {
        let mut snapshots: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with("snapshot_") && name.ends_with(".json"))
                    .unwrap_or(false)
            })
            .collect();
        snapshots.sort();

        if snapshots.len() > self.retention {
            let excess = snapshots.len() - self.retention;
            for path in snapshots.into_iter().take(excess) {
                fs::remove_file(&path)?;
                tracing::debug!(path = %path.display(), "pruned old backup");
            }
        }
        Ok(())
    }
}
