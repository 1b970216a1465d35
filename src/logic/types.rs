use crate::market::Pair;
use serde::Serialize;
use std::time::Duration;

/// Standalone statistics of one pair, served for single-pair queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairStats {
    /// Sum of the base volume over every exchange
    pub combined_volume: f64,
    /// Volume-weighted mid of bid and ask, 0 without volume
    pub spread_average: f64,
}

impl From<&Pair> for PairStats {
    fn from(pair: &Pair) -> Self {
        Self { combined_volume: pair.combined_volume(), spread_average: pair.spread_average() }
    }
}

/// Statistics about the Rebaser's current state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebaserStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub computed_markets: u64,
    pub in_flight: usize,
    pub max_concurrency: usize,
    pub default_max_depth: u8,
    pub worker_timeout: Duration,
}

impl RebaserStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 { 0.0 } else { self.cache_hits as f64 / total as f64 }
    }
}
