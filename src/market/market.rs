use super::pair::Pair;
use super::pair_id::PairId;
use super::token::TokenAddress;
use crate::graph::{NeighborIndex, PairGraph};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Rebased pair mapping. Shared between the cache and every `RebasedMarket` handed out for the same key.
pub type RebasedPairs = Arc<HashMap<PairId, Pair>>;

/// Immutable snapshot of all known pairs. Nodes of the market graph are tokens, edges are pairs.
#[derive(Debug, Clone, Default)]
pub struct Market {
    pairs: HashMap<PairId, Pair>,
    // Adjacency for path discovery, always in sync with `pairs`
    pair_graph: PairGraph,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = Pair>>(pairs: I) -> Result<Self> {
        let mut market = Market::new();
        for pair in pairs {
            market.add_pair(pair)?;
        }
        Ok(market)
    }

    /// Add a pair to the market. If a pair with the same id exists, the exchange observations are merged
    /// and entries for the same exchange are replaced. Observations of the opposite orientation are
    /// inverted into the existing pair's orientation first.
    pub fn add_pair(&mut self, pair: Pair) -> Result<()> {
        let pair_id = pair.id();

        if let Some(existing) = self.pairs.get_mut(&pair_id) {
            if existing.base_address == pair.base_address {
                debug!(%pair_id, exchanges = pair.market_data.len(), "Merging market data into existing pair");
                existing.market_data.extend(pair.market_data);
            } else {
                debug!(%pair_id, exchanges = pair.market_data.len(), "Merging inverted market data into existing pair");
                existing.market_data.extend(pair.market_data.into_iter().map(|(exchange, data)| (exchange, data.inverted())));
            }
            return Ok(());
        }

        self.pair_graph.add_pair(&pair)?;
        self.pairs.insert(pair_id, pair);
        Ok(())
    }

    pub fn get_pair(&self, pair_id: &PairId) -> Option<&Pair> {
        self.pairs.get(pair_id)
    }

    /// Direct pair between two tokens, in either orientation.
    pub fn get_pair_between(&self, a: &TokenAddress, b: &TokenAddress) -> Option<&Pair> {
        self.pairs.get(&PairId::new(a, b))
    }

    pub fn pairs(&self) -> &HashMap<PairId, Pair> {
        &self.pairs
    }

    pub fn pair_ids(&self) -> impl Iterator<Item = &PairId> {
        self.pairs.keys()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pair_graph(&self) -> &PairGraph {
        &self.pair_graph
    }
}

impl NeighborIndex for Market {
    fn pair(&self, pair_id: &PairId) -> Option<&Pair> {
        self.pairs.get(pair_id)
    }

    fn base_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId> {
        self.pair_graph.base_neighbors(pair_id)
    }

    fn quote_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId> {
        self.pair_graph.quote_neighbors(pair_id)
    }
}

/// A market whose every rate is denominated in `base_address`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebasedMarket {
    pub base_address: TokenAddress,
    pub pairs: RebasedPairs,
}

impl RebasedMarket {
    pub fn new(base_address: TokenAddress, pairs: RebasedPairs) -> Self {
        Self { base_address, pairs }
    }

    pub fn get_pair(&self, pair_id: &PairId) -> Option<&Pair> {
        self.pairs.get(pair_id)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
