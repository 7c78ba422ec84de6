//! Per-asset random streams for the Monte-Carlo step.
//!
//! Each asset draws from its own `StdRng`, seeded from BLAKE3 of
//! (master seed, symbol, stream). Streams never share state, so a watchlist
//! gives the same estimates on one thread or many.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Hash-derived, so independent of the order streams are requested in.
    pub fn sub_seed(&self, symbol: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    pub fn rng_for(&self, symbol: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, iteration))
    }

    /// Stream for evaluating `symbol` as of `as_of`: re-running a day replays
    /// the same paths, a new day draws fresh ones.
    pub fn for_session(&self, symbol: &str, as_of: NaiveDate) -> StdRng {
        let day = u64::try_from(as_of.num_days_from_ce()).unwrap_or_default();
        self.rng_for(symbol, day)
    }
}
