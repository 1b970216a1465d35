use super::pair_graph::NeighborIndex;
use crate::market::{Pair, PairId, TokenAddress};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// The pair endpoint a path search travels through.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Pivot {
    Base,
    Quote,
}

impl Pivot {
    /// The endpoint of `pair` this pivot selects.
    pub fn address<'a>(&self, pair: &'a Pair) -> &'a TokenAddress {
        match self {
            Pivot::Base => &pair.base_address,
            Pivot::Quote => &pair.quote_address,
        }
    }

    /// Pairs adjacent to `pair_id` through the selected endpoint.
    pub fn neighbors<N: NeighborIndex + ?Sized>(&self, index: &N, pair_id: &PairId) -> BTreeSet<PairId> {
        match self {
            Pivot::Base => index.base_neighbors(pair_id),
            Pivot::Quote => index.quote_neighbors(pair_id),
        }
    }
}

/// Chain of pairs from a starting pair to a pair whose base is the rebase target.
///
/// The head (index 0) is the pair nearest the target, the tail is the starting pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RebasePath {
    pub pivot: Pivot,
    pub pairs: VecDeque<PairId>,
}

impl fmt::Display for RebasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RebasePath(pivot={}, pairs={:?})", self.pivot, self.pairs.iter().map(|p| p.to_string()).collect::<Vec<String>>())
    }
}

impl RebasePath {
    /// Create a path that only holds the starting pair
    pub fn new_first(pivot: Pivot, start: PairId) -> Self {
        Self { pivot, pairs: VecDeque::from([start]) }
    }

    pub fn new(pivot: Pivot, pairs: Vec<PairId>) -> Self {
        Self { pivot, pairs: pairs.into() }
    }

    /// Extend the path toward the target. The new pair becomes the head.
    pub fn prepend(&self, pair_id: PairId) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.push_front(pair_id);
        Self { pivot: self.pivot, pairs }
    }

    pub fn head(&self) -> Option<&PairId> {
        self.pairs.front()
    }

    pub fn start(&self) -> Option<&PairId> {
        self.pairs.back()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every pair except the starting one, head first.
    pub fn intermediate_pairs(&self) -> impl Iterator<Item = &PairId> {
        self.pairs.iter().take(self.pairs.len().saturating_sub(1))
    }

    pub fn contains_pair(&self, pair_id: &PairId) -> bool {
        self.pairs.contains(pair_id)
    }

    /// Resolve every pair id in path order. Returns `None` if any pair is unknown to the index.
    pub fn resolve<'a, N: NeighborIndex + ?Sized>(&self, index: &'a N) -> Option<Vec<&'a Pair>> {
        self.pairs.iter().map(|pair_id| index.pair(pair_id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_id(a: u8, b: u8) -> PairId {
        PairId::new(&TokenAddress::repeat_byte(a), &TokenAddress::repeat_byte(b))
    }

    #[test]
    fn test_prepend_keeps_start_at_tail() {
        let start = pair_id(1, 2);
        let path = RebasePath::new_first(Pivot::Base, start).prepend(pair_id(1, 3)).prepend(pair_id(3, 4));

        assert_eq!(path.len(), 3);
        assert_eq!(path.start(), Some(&start));
        assert_eq!(path.head(), Some(&pair_id(3, 4)));
        assert_eq!(path.intermediate_pairs().copied().collect::<Vec<_>>(), vec![pair_id(3, 4), pair_id(1, 3)]);
    }

    #[test]
    fn test_single_pair_path_has_no_intermediates() {
        let path = RebasePath::new_first(Pivot::Quote, pair_id(1, 2));
        assert_eq!(path.intermediate_pairs().count(), 0);
        assert!(path.contains_pair(&pair_id(2, 1)));
    }

    #[test]
    fn test_pivot_address() {
        let pair = Pair::new(TokenAddress::repeat_byte(1), TokenAddress::repeat_byte(2), "A", "B");
        assert_eq!(Pivot::Base.address(&pair), &TokenAddress::repeat_byte(1));
        assert_eq!(Pivot::Quote.address(&pair), &TokenAddress::repeat_byte(2));
        assert_eq!(Pivot::Quote.to_string(), "quote");
    }
}
