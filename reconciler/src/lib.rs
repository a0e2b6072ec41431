//! Vote reconciliation for the Agora bridge.
//!
//! Consumes community vote events from the chat platform, maintains the
//! per-proposal vote ledger and derives the displayed status by putting
//! community sentiment next to the authoritative on-chain tally. Community
//! votes are advisory; no volume of them ever changes a chain outcome.

pub mod error;
pub mod reconciler;

pub use error::VoteError;
pub use reconciler::VoteReconciler;
