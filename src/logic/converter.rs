use crate::market::{Market, Pair, TokenAddress};
use tracing::trace;

/// Convert `rate` from `from_address` into `to_address` terms through the direct pair between the two tokens.
///
/// Identity when both addresses match. Returns `None` when the market has no direct pair.
pub fn try_convert(rate: f64, to_address: &TokenAddress, from_address: &TokenAddress, market: &Market) -> Option<f64> {
    if to_address == from_address {
        return Some(rate);
    }
    market.get_pair_between(to_address, from_address).map(|pair| rate * pair.spread_average())
}

/// Like [`try_convert`] but a missing direct pair yields 0.
///
/// A 0 result cannot be told apart from a legitimately zero rate, and it propagates through every
/// multi-hop composition depending on it. Use [`try_convert`] where the difference matters.
pub fn convert(rate: f64, to_address: &TokenAddress, from_address: &TokenAddress, market: &Market) -> f64 {
    match try_convert(rate, to_address, from_address, market) {
        Some(converted) => converted,
        None => {
            trace!(%to_address, %from_address, "No direct pair for conversion");
            0.0
        }
    }
}

/// Single-hop rebase of a rate of `pair` into `rebase_address`, without any path search.
pub fn shallow_rebase(rate: f64, pair: &Pair, rebase_address: &TokenAddress, market: &Market) -> f64 {
    convert(rate, rebase_address, &pair.base_address, market)
}
