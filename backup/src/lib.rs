//! Rotating store backups for the Agora bridge.
//!
//! Snapshots the persistent store on a schedule and once more at shutdown,
//! keeping a bounded history of timestamped files. Backup failures are
//! logged and never propagate to the monitor or reconciler.

pub mod error;
pub mod manager;

pub use error::BackupError;
pub use manager::BackupManager;
