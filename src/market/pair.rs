use super::pair_id::PairId;
use super::token::TokenAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// Decentralized exchanges a pair observation can originate from.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, VariantNames, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    Uniswap,
    Oasis,
    Kyber,
    Idex,
    Ddex,
    RadarRelay,
    Tokenstore,
    Paradex,
}

/// The four numeric fields of an exchange observation that get rebased.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum RateField {
    LastPrice,
    CurrentBid,
    CurrentAsk,
    BaseVolume,
}

/// A single exchange's view on a pair. Prices are quote-token per base-token, volume is in base-token units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeMarketData {
    pub last_price: f64,
    pub current_bid: f64,
    pub current_ask: f64,
    pub base_volume: f64,
}

impl ExchangeMarketData {
    pub fn new(last_price: f64, current_bid: f64, current_ask: f64, base_volume: f64) -> Self {
        Self { last_price, current_bid, current_ask, base_volume }
    }

    pub fn get(&self, field: RateField) -> f64 {
        match field {
            RateField::LastPrice => self.last_price,
            RateField::CurrentBid => self.current_bid,
            RateField::CurrentAsk => self.current_ask,
            RateField::BaseVolume => self.base_volume,
        }
    }

    pub fn set(&mut self, field: RateField, value: f64) {
        match field {
            RateField::LastPrice => self.last_price = value,
            RateField::CurrentBid => self.current_bid = value,
            RateField::CurrentAsk => self.current_ask = value,
            RateField::BaseVolume => self.base_volume = value,
        }
    }

    /// The same observation quoted the other way round. Prices invert, bid and ask swap
    /// and the volume is restated in the new base token at the observed price.
    pub fn inverted(&self) -> Self {
        let reference_price = if self.last_price > 0.0 { self.last_price } else { (self.current_bid + self.current_ask) / 2.0 };

        Self {
            last_price: invert_price(self.last_price),
            current_bid: invert_price(self.current_ask),
            current_ask: invert_price(self.current_bid),
            base_volume: self.base_volume * reference_price,
        }
    }
}

fn invert_price(price: f64) -> f64 {
    if price == 0.0 { 0.0 } else { 1.0 / price }
}

/// A tradeable base/quote combination together with its per-exchange observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub base_address: TokenAddress,
    pub quote_address: TokenAddress,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub market_data: BTreeMap<Exchange, ExchangeMarketData>,
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.base_symbol, self.quote_symbol, self.id())
    }
}

impl Pair {
    pub fn new<B: Into<TokenAddress>, Q: Into<TokenAddress>>(base_address: B, quote_address: Q, base_symbol: &str, quote_symbol: &str) -> Self {
        Self {
            base_address: base_address.into(),
            quote_address: quote_address.into(),
            base_symbol: base_symbol.to_string(),
            quote_symbol: quote_symbol.to_string(),
            market_data: BTreeMap::new(),
        }
    }

    pub fn with_market_data(mut self, exchange: Exchange, market_data: ExchangeMarketData) -> Self {
        self.market_data.insert(exchange, market_data);
        self
    }

    pub fn id(&self) -> PairId {
        PairId::new(&self.base_address, &self.quote_address)
    }

    /// Sum of the base volume across all exchanges.
    pub fn combined_volume(&self) -> f64 {
        self.market_data.values().map(|data| data.base_volume).sum()
    }

    /// Volume-weighted average of bid and ask across all exchanges, averaged together.
    /// This is the pair's own effective exchange rate. Returns 0 when the pair has no volume.
    pub fn spread_average(&self) -> f64 {
        let combined_volume = self.combined_volume();
        if combined_volume == 0.0 {
            return 0.0;
        }

        let (weighted_bids, weighted_asks) = self.market_data.values().fold((0.0, 0.0), |(bids, asks), data| {
            (bids + data.current_bid * data.base_volume, asks + data.current_ask * data.base_volume)
        });

        (weighted_bids / combined_volume + weighted_asks / combined_volume) / 2.0
    }

    /// Returns true if the token is one of the pair's endpoints.
    pub fn contains(&self, address: &TokenAddress) -> bool {
        self.base_address == *address || self.quote_address == *address
    }
}
