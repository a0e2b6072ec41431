//! Governance monitor for the Agora bridge.
//!
//! Polls the chain reader on a fixed interval, diffs the returned proposal
//! set against the local cache, mirrors changes into the store and drives
//! thread publication on the chat platform. Failures are isolated per
//! proposal: one broken publish never aborts the rest of the cycle.

pub mod error;
pub mod event;
pub mod monitor;
pub mod publisher;
pub mod retry;

pub use error::MonitorError;
pub use event::ProposalChangeEvent;
pub use monitor::GovernanceMonitor;
pub use publisher::{PublishError, ThreadPublisher, VoteWidget};
pub use retry::RetryTracker;
