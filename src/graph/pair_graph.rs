use crate::market::{Pair, PairId, TokenAddress};
use ahash::RandomState;
use eyre::eyre;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// Adjacency lookups used by path discovery.
///
/// Neighbor sets never contain the queried pair itself and must reflect the same market
/// snapshot that `pair` resolves against.
pub trait NeighborIndex {
    /// Resolve a pair by id.
    fn pair(&self, pair_id: &PairId) -> Option<&Pair>;

    /// Pairs sharing the base address of the given pair.
    fn base_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId>;

    /// Pairs sharing the quote address of the given pair.
    fn quote_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId>;
}

/// Undirected token graph: nodes are token addresses, every edge is one pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairGraph {
    pub graph: UnGraph<TokenAddress, PairId, usize>,
    // token_address -> node index
    pub token_index: FastHashMap<TokenAddress, NodeIndex<usize>>,
    // pair -> (base node, quote node)
    pub pair_index: FastHashMap<PairId, (NodeIndex<usize>, NodeIndex<usize>)>,
}

impl PairGraph {
    pub fn new() -> Self {
        Self { graph: UnGraph::default(), token_index: FastHashMap::default(), pair_index: FastHashMap::default() }
    }

    pub fn add_or_get_token_idx(&mut self, address: &TokenAddress) -> NodeIndex<usize> {
        if let Some(&idx) = self.token_index.get(address) {
            return idx;
        }
        let idx = self.graph.add_node(address.clone());
        self.token_index.insert(address.clone(), idx);
        idx
    }

    /// Add a pair as an edge between its two tokens. Adding a pair that is already known is a no-op.
    pub fn add_pair(&mut self, pair: &Pair) -> eyre::Result<()> {
        if pair.base_address == pair.quote_address {
            return Err(eyre!("Pair must connect two distinct tokens: {}", pair.base_address));
        }

        let pair_id = pair.id();
        if self.pair_index.contains_key(&pair_id) {
            return Ok(());
        }

        let base_node = self.add_or_get_token_idx(&pair.base_address);
        let quote_node = self.add_or_get_token_idx(&pair.quote_address);
        self.graph.add_edge(base_node, quote_node, pair_id);
        self.pair_index.insert(pair_id, (base_node, quote_node));

        Ok(())
    }

    pub fn contains_pair(&self, pair_id: &PairId) -> bool {
        self.pair_index.contains_key(pair_id)
    }

    pub fn token_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn pair_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All pairs touching the given token.
    pub fn token_pairs(&self, address: &TokenAddress) -> BTreeSet<PairId> {
        match self.token_index.get(address) {
            Some(node) => self.graph.edges(*node).map(|edge| *edge.weight()).collect(),
            None => BTreeSet::new(),
        }
    }

    pub fn base_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId> {
        match self.pair_index.get(pair_id) {
            Some((base_node, _)) => self.node_pairs_except(*base_node, pair_id),
            None => BTreeSet::new(),
        }
    }

    pub fn quote_neighbors(&self, pair_id: &PairId) -> BTreeSet<PairId> {
        match self.pair_index.get(pair_id) {
            Some((_, quote_node)) => self.node_pairs_except(*quote_node, pair_id),
            None => BTreeSet::new(),
        }
    }

    fn node_pairs_except(&self, node: NodeIndex<usize>, excluded: &PairId) -> BTreeSet<PairId> {
        self.graph.edges(node).map(|edge| *edge.weight()).filter(|pair_id| pair_id != excluded).collect()
    }
}
