//! Bounded exponential backoff for thread publication.
//!
//! Publish failures are retried across subsequent poll cycles with a
//! doubling delay and an attempt cap. Tracking is in-memory only: after a
//! restart every threadless proposal is eligible again immediately.

use std::collections::HashMap;

use agora_types::{ProposalId, Timestamp};

/// Maximum publish attempts per proposal.
const MAX_ATTEMPTS: u32 = 8;
/// Delay after the first failure (seconds).
const INITIAL_DELAY_SECS: u64 = 60;
/// Delay ceiling (seconds).
const MAX_DELAY_SECS: u64 = 6 * 60 * 60;

struct RetryEntry {
    attempts: u32,
    next_attempt_at: Timestamp,
    delay_secs: u64,
}

/// Per-proposal publish retry state.
pub struct RetryTracker {
    entries: HashMap<ProposalId, RetryEntry>,
    max_attempts: u32,
}

impl RetryTracker {
    pub fn new() -> Self {
        Self::with_max_attempts(MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            entries: HashMap::new(),
            max_attempts,
        }
    }

    /// Whether a publish attempt for this proposal is due at `now`.
    pub fn is_due(&self, proposal_id: ProposalId, now: Timestamp) -> bool {
        match self.entries.get(&proposal_id) {
            None => true,
            Some(entry) => {
                entry.attempts < self.max_attempts && now >= entry.next_attempt_at
            }
        }
    }

    /// Whether the attempt budget for this proposal is spent.
    pub fn is_exhausted(&self, proposal_id: ProposalId) -> bool {
        self.entries
            .get(&proposal_id)
            .map(|e| e.attempts >= self.max_attempts)
            .unwrap_or(false)
    }

    /// Record a failed attempt and push the next one out.
    pub fn record_failure(&mut self, proposal_id: ProposalId, now: Timestamp) {
        let entry = self.entries.entry(proposal_id).or_insert(RetryEntry {
            attempts: 0,
            next_attempt_at: now,
            delay_secs: INITIAL_DELAY_SECS,
        });
        entry.attempts += 1;
        entry.next_attempt_at = now.plus(entry.delay_secs);
        entry.delay_secs = (entry.delay_secs * 2).min(MAX_DELAY_SECS);
    }

    /// Publication succeeded; drop the tracking entry.
    pub fn record_success(&mut self, proposal_id: ProposalId) {
        self.entries.remove(&proposal_id);
    }

    /// Reset a proposal's budget (used by the on-demand refresh command).
    pub fn reset(&mut self, proposal_id: ProposalId) {
        self.entries.remove(&proposal_id);
    }
}

impl Default for RetryTracker {
    fn default() -> Self {
        Self::new()
    }
}
