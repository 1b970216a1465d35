/// Data Layer
///
/// Value types of the market graph: tokens, pair ids, pairs with their per-exchange
/// observations, the market snapshot the engine reads, and the engine configuration.
pub mod market;
pub mod market_config;
pub mod pair;
pub mod pair_id;
pub mod token;

pub use market::{Market, RebasedMarket, RebasedPairs};
pub use market_config::{RebaseConfig, RebaseConfigRoot};
pub use pair::{Exchange, ExchangeMarketData, Pair, RateField};
pub use pair_id::PairId;
pub use token::TokenAddress;
