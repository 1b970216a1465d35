use super::converter::{convert, shallow_rebase};
use crate::constants::MAX_SEARCH_STATES;
use crate::error::RebaseError;
use crate::graph::{Pivot, RebasePath, find_all_rebase_paths_bounded};
use crate::market::{Market, Pair, RateField, TokenAddress};
use strum::IntoEnumIterator;
use tracing::trace;

/// Rebased rate of a single path.
///
/// The running value is converted between the pivot addresses of neighbouring pairs. The boundary hop
/// inside the head pair, whose base is already the target, passes the value through unchanged.
/// Base-direction paths fold from the starting pair toward the head, quote-direction paths from the head
/// toward the starting pair.
pub fn rebased_path_rate(rate: f64, path: &RebasePath, market: &Market) -> f64 {
    let Some(pairs) = path.resolve(market) else {
        return 0.0;
    };
    let pivots: Vec<&TokenAddress> = pairs.iter().map(|pair| path.pivot.address(pair)).collect();
    let hop = |value: f64, i: usize| convert(value, pivots[i], pivots[i + 1], market);
    let hops = pivots.len().saturating_sub(1);

    match path.pivot {
        Pivot::Base => (0..hops).rev().fold(rate, hop),
        Pivot::Quote => (0..hops).fold(rate, hop),
    }
}

/// Weight of a path: the mean trading volume, in target units, of every pair except the starting one.
/// A path made of the starting pair only is weighted by that pair's own volume.
pub fn path_weight(path: &RebasePath, rebase_address: &TokenAddress, market: &Market) -> f64 {
    let Some(pairs) = path.resolve(market) else {
        return 0.0;
    };
    let weighted = if pairs.len() > 1 { &pairs[..pairs.len() - 1] } else { &pairs[..] };
    if weighted.is_empty() {
        return 0.0;
    }

    let total: f64 = weighted.iter().map(|pair| convert(pair.combined_volume(), rebase_address, &pair.base_address, market)).sum();
    total / weighted.len() as f64
}

/// Volume-weighted rebasing of one starting pair.
///
/// Paths and their weights depend only on the pair, the target and the depth, so they are computed once
/// and reused for every rate of the pair.
pub struct RebaseCalculator<'a> {
    market: &'a Market,
    weighted_paths: Vec<(RebasePath, f64)>,
}

impl<'a> RebaseCalculator<'a> {
    /// Discover every path of `pair` toward `rebase_address` in both directions
    pub fn for_pair(pair: &Pair, rebase_address: &TokenAddress, market: &'a Market, max_depth: u8) -> Result<Self, RebaseError> {
        Self::for_pair_bounded(pair, rebase_address, market, max_depth, MAX_SEARCH_STATES)
    }

    /// Like [`RebaseCalculator::for_pair`] with an explicit limit on states expanded per search direction
    pub fn for_pair_bounded(
        pair: &Pair,
        rebase_address: &TokenAddress,
        market: &'a Market,
        max_depth: u8,
        max_states: usize,
    ) -> Result<Self, RebaseError> {
        let (base_paths, quote_paths) = find_all_rebase_paths_bounded(market, &pair.id(), rebase_address, max_depth, max_states)?;
        trace!(%pair, base_paths = base_paths.len(), quote_paths = quote_paths.len(), "Discovered rebase paths");
        Ok(Self::from_paths(base_paths.into_iter().chain(quote_paths), rebase_address, market))
    }

    pub fn from_paths<I: IntoIterator<Item = RebasePath>>(paths: I, rebase_address: &TokenAddress, market: &'a Market) -> Self {
        let weighted_paths = paths
            .into_iter()
            .map(|path| {
                let weight = path_weight(&path, rebase_address, market);
                (path, weight)
            })
            .collect();
        Self { market, weighted_paths }
    }

    pub fn path_count(&self) -> usize {
        self.weighted_paths.len()
    }

    /// Sum of all path weights
    pub fn combined_volume(&self) -> f64 {
        self.weighted_paths.iter().map(|(_, weight)| weight).sum()
    }

    /// Weighted average of the rebased rate over every path. 0 when no path carries weight.
    pub fn rebase(&self, rate: f64) -> f64 {
        let (combined_volume, volume_weighted_sum) =
            self.weighted_paths.iter().fold((0.0, 0.0), |(combined_volume, volume_weighted_sum), (path, weight)| {
                (combined_volume + weight, volume_weighted_sum + weight * rebased_path_rate(rate, path, self.market))
            });

        if combined_volume != 0.0 { volume_weighted_sum / combined_volume } else { 0.0 }
    }
}

/// Rebase `rate` of `original_pair` into `rebase_address` across every path of at most `max_depth` pairs.
pub fn deep_rebase(rate: f64, original_pair: &Pair, rebase_address: &TokenAddress, market: &Market, max_depth: u8) -> Result<f64, RebaseError> {
    Ok(RebaseCalculator::for_pair(original_pair, rebase_address, market, max_depth)?.rebase(rate))
}

/// Copy of `pair` with every field of every exchange observation deep-rebased.
pub fn rebase_pair(pair: &Pair, rebase_address: &TokenAddress, market: &Market, max_depth: u8) -> Result<Pair, RebaseError> {
    rebase_pair_bounded(pair, rebase_address, market, max_depth, MAX_SEARCH_STATES)
}

pub fn rebase_pair_bounded(
    pair: &Pair,
    rebase_address: &TokenAddress,
    market: &Market,
    max_depth: u8,
    max_states: usize,
) -> Result<Pair, RebaseError> {
    let calculator = RebaseCalculator::for_pair_bounded(pair, rebase_address, market, max_depth, max_states)?;
    Ok(map_rates(pair, |rate| calculator.rebase(rate)))
}

/// Copy of `pair` with every field converted through the direct pair to `rebase_address` only.
pub fn shallow_rebase_pair(pair: &Pair, rebase_address: &TokenAddress, market: &Market) -> Pair {
    map_rates(pair, |rate| shallow_rebase(rate, pair, rebase_address, market))
}

fn map_rates<F: Fn(f64) -> f64>(pair: &Pair, rebase: F) -> Pair {
    let mut rebased = pair.clone();
    for market_data in rebased.market_data.values_mut() {
        for field in RateField::iter() {
            market_data.set(field, rebase(market_data.get(field)));
        }
    }
    rebased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Exchange, ExchangeMarketData};

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9 * expected.abs().max(1.0), "expected {expected}, got {actual}");
    }

    fn weth() -> TokenAddress {
        "0xweth".into()
    }

    fn pair(base: &str, quote: &str, bid: f64, ask: f64, volume: f64) -> Pair {
        Pair::new(format!("0x{}", base.to_lowercase()), format!("0x{}", quote.to_lowercase()), base, quote)
            .with_market_data(Exchange::Uniswap, ExchangeMarketData::new((bid + ask) / 2.0, bid, ask, volume))
    }

    /// MKR/USDC reaches WETH through WETH/MKR (base side) and WETH/USDC (quote side)
    fn two_route_market() -> eyre::Result<(Market, Pair)> {
        let mkr_usdc = pair("MKR", "USDC", 495.0, 505.0, 40.0);
        let weth_mkr = pair("WETH", "MKR", 0.25, 0.75, 20.0);
        let weth_usdc = pair("WETH", "USDC", 1990.0, 2010.0, 5.0);
        let market = Market::from_pairs(vec![mkr_usdc.clone(), weth_mkr, weth_usdc])?;
        Ok((market, mkr_usdc))
    }

    #[test]
    fn test_weighted_average_over_both_directions() -> eyre::Result<()> {
        let (market, mkr_usdc) = two_route_market()?;

        let calculator = RebaseCalculator::for_pair(&mkr_usdc, &weth(), &market, 2)?;
        assert_eq!(calculator.path_count(), 2);
        assert_close(calculator.combined_volume(), 25.0);

        // base route: 100 * 0.5 weighted 20, quote route: 100 weighted 5
        assert_close(calculator.rebase(100.0), 60.0);
        assert_close(deep_rebase(100.0, &mkr_usdc, &weth(), &market, 2)?, 60.0);
        Ok(())
    }

    #[test]
    fn test_three_pair_path_needs_depth() -> eyre::Result<()> {
        let link_usdc = pair("LINK", "USDC", 10.0, 10.0, 1.0);
        let dai_link = pair("DAI", "LINK", 0.25, 0.25, 50.0);
        let weth_dai = pair("WETH", "DAI", 1900.0, 2100.0, 10.0);
        let market = Market::from_pairs(vec![link_usdc.clone(), dai_link, weth_dai])?;

        assert_eq!(deep_rebase(100.0, &link_usdc, &weth(), &market, 2)?, 0.0);
        // 100 * spread(DAI/LINK) * spread(WETH/DAI)
        assert_close(deep_rebase(100.0, &link_usdc, &weth(), &market, 3)?, 50_000.0);
        Ok(())
    }

    #[test]
    fn test_path_weight_averages_intermediate_pairs() -> eyre::Result<()> {
        let link_usdc = pair("LINK", "USDC", 10.0, 10.0, 1.0);
        let dai_link = pair("DAI", "LINK", 0.25, 0.25, 50.0);
        let weth_dai = pair("WETH", "DAI", 1900.0, 2100.0, 10.0);
        let market = Market::from_pairs(vec![link_usdc.clone(), dai_link.clone(), weth_dai.clone()])?;

        let path = RebasePath::new(Pivot::Base, vec![weth_dai.id(), dai_link.id(), link_usdc.id()]);
        // WETH/DAI volume is already in WETH, DAI/LINK volume 50 DAI converts at 2000
        assert_close(path_weight(&path, &weth(), &market), (10.0 + 100_000.0) / 2.0);
        assert_close(rebased_path_rate(1.0, &path, &market), 500.0);
        Ok(())
    }

    #[test]
    fn test_pair_with_target_base_is_fixed_point() -> eyre::Result<()> {
        let weth_dai = pair("WETH", "DAI", 1990.0, 2010.0, 30.0);
        let market = Market::from_pairs(vec![weth_dai.clone(), pair("MKR", "DAI", 1.0, 1.0, 1.0)])?;

        let rebased = rebase_pair(&weth_dai, &weth(), &market, 2)?;
        let original = weth_dai.market_data[&Exchange::Uniswap];
        let data = rebased.market_data[&Exchange::Uniswap];

        assert_close(data.last_price, original.last_price);
        assert_close(data.current_bid, original.current_bid);
        assert_close(data.current_ask, original.current_ask);
        assert_close(data.base_volume, original.base_volume);
        Ok(())
    }

    #[test]
    fn test_unreachable_target_rebases_to_zero() -> eyre::Result<()> {
        let (market, mkr_usdc) = two_route_market()?;
        let unknown: TokenAddress = "0xunknown".into();

        let rebased = rebase_pair(&mkr_usdc, &unknown, &market, 2)?;
        let data = rebased.market_data[&Exchange::Uniswap];

        assert_eq!(data, ExchangeMarketData::new(0.0, 0.0, 0.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_deep_rebase_is_deterministic() -> eyre::Result<()> {
        let (market, mkr_usdc) = two_route_market()?;

        let first = deep_rebase(123.456, &mkr_usdc, &weth(), &market, 3)?;
        for _ in 0..10 {
            assert_eq!(deep_rebase(123.456, &mkr_usdc, &weth(), &market, 3)?, first);
        }
        Ok(())
    }

    #[test]
    fn test_quote_direction_folds_from_head() -> eyre::Result<()> {
        let (market, mkr_usdc) = two_route_market()?;
        let weth_usdc = market.get_pair_between(&weth(), &"0xusdc".into()).unwrap().clone();

        // both pivots are USDC, so the only hop is the identity
        let path = RebasePath::new(Pivot::Quote, vec![weth_usdc.id(), mkr_usdc.id()]);
        assert_eq!(rebased_path_rate(42.0, &path, &market), 42.0);
        assert_close(path_weight(&path, &weth(), &market), 5.0);
        Ok(())
    }

    #[test]
    fn test_shallow_rebase_pair() -> eyre::Result<()> {
        let (market, _) = two_route_market()?;
        let weth_mkr = market.get_pair_between(&weth(), &"0xmkr".into()).unwrap().clone();
        let mkr_usdc = market.get_pair_between(&"0xmkr".into(), &"0xusdc".into()).unwrap().clone();

        let rebased = shallow_rebase_pair(&mkr_usdc, &weth(), &market);
        let data = rebased.market_data[&Exchange::Uniswap];

        assert_close(data.last_price, 500.0 * weth_mkr.spread_average());
        assert_close(data.base_volume, 40.0 * 0.5);
        Ok(())
    }

    #[test]
    fn test_zero_weight_paths_resolve_to_zero() -> eyre::Result<()> {
        let mkr_usdc = pair("MKR", "USDC", 495.0, 505.0, 40.0);
        let weth_mkr = pair("WETH", "MKR", 0.25, 0.75, 0.0);
        let market = Market::from_pairs(vec![mkr_usdc.clone(), weth_mkr])?;

        assert_eq!(deep_rebase(100.0, &mkr_usdc, &weth(), &market, 2)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_search_limit_fails_pair_rebase() -> eyre::Result<()> {
        let (market, mkr_usdc) = two_route_market()?;

        let result = rebase_pair_bounded(&mkr_usdc, &weth(), &market, 3, 1);
        assert!(matches!(result, Err(RebaseError::SearchLimitExceeded { pair_id, limit: 1 }) if pair_id == mkr_usdc.id()));

        // the default limit is far above what this market needs
        let rebased = rebase_pair(&mkr_usdc, &weth(), &market, 3)?;
        assert_eq!(rebased.id(), mkr_usdc.id());
        Ok(())
    }
}
