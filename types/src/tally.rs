//! Aggregate vote tallies, on-chain and community-side.
//!
//! The two are deliberately separate types: on-chain weights are
//! chain-native units and authoritative, community counts are advisory
//! head-counts. They are reported side by side, never merged.

use serde::{Deserialize, Serialize};

/// On-chain vote weights in chain-native units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub aye_weight: u128,
    pub nay_weight: u128,
    pub recuse_weight: u128,
}

impl Tally {
    pub fn new(aye_weight: u128, nay_weight: u128, recuse_weight: u128) -> Self {
        Self {
            aye_weight,
            nay_weight,
            recuse_weight,
        }
    }
}

/// Community vote counts (one per voter, not weighted).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityCounts {
    pub aye: u64,
    pub nay: u64,
    pub recuse: u64,
}

impl CommunityCounts {
    pub fn total(&self) -> u64 {
        self.aye + self.nay + self.recuse
    }
}
