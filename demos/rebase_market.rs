/// Market rebase demo
///
/// Builds a small DEX market, rebases every pair into WETH and prints the result as JSON.
/// Pass a TOML file with a `[rebase]` section as the first argument to override the
/// defaults, otherwise the `REBASE_*` environment variables are used.
use eyre::Result;
use market_rebase::{ConfigLoader, Exchange, ExchangeMarketData, Market, Pair, RebaseConfig, Rebaser, TokenAddress};
use std::sync::Arc;
use tracing::info;

const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
const MKR: &str = "0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2";
const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).with_target(false).init();

    let config = match std::env::args().nth(1) {
        Some(file_name) => RebaseConfig::load_section_from_file(file_name).await?,
        None => RebaseConfig::from_env()?,
    };
    info!(?config, "Loaded rebase config");

    let market = Arc::new(create_demo_market()?);
    let rebaser = Rebaser::builder().with_config(config).build()?;
    let weth = TokenAddress::from(WETH);

    let rebased = rebaser.rebase_market_default_depth(&weth, market.clone()).await?;
    info!(pairs = rebased.len(), "Market rebased into WETH");

    for pair in market.pairs().values() {
        let stats = rebaser.pair_stats(pair);
        info!(%pair, combined_volume = stats.combined_volume, spread_average = stats.spread_average, "Pair stats");
    }

    // served from cache
    let again = rebaser.rebase_market_default_depth(&weth, market).await?;
    info!(stats = ?rebaser.get_statistics(), shared = Arc::ptr_eq(&rebased.pairs, &again.pairs), "Engine statistics");

    println!("{}", serde_json::to_string_pretty(&rebased)?);
    Ok(())
}

fn create_demo_market() -> Result<Market> {
    let mut market = Market::new();

    market.add_pair(
        Pair::new(WETH, DAI, "WETH", "DAI")
            .with_market_data(Exchange::Uniswap, ExchangeMarketData::new(2001.0, 1995.0, 2005.0, 120.0))
            .with_market_data(Exchange::Oasis, ExchangeMarketData::new(1999.0, 1990.0, 2008.0, 40.0)),
    )?;
    market.add_pair(
        Pair::new(WETH, MKR, "WETH", "MKR").with_market_data(Exchange::Kyber, ExchangeMarketData::new(1.42, 1.40, 1.44, 25.0)),
    )?;
    market.add_pair(
        Pair::new(MKR, DAI, "MKR", "DAI").with_market_data(Exchange::Uniswap, ExchangeMarketData::new(1410.0, 1400.0, 1420.0, 60.0)),
    )?;
    market.add_pair(
        Pair::new(DAI, USDC, "DAI", "USDC")
            .with_market_data(Exchange::Ddex, ExchangeMarketData::new(1.0, 0.999, 1.001, 500_000.0))
            .with_market_data(Exchange::Paradex, ExchangeMarketData::new(1.0, 0.998, 1.002, 250_000.0)),
    )?;
    market.add_pair(
        Pair::new(USDC, WETH, "USDC", "WETH").with_market_data(Exchange::Idex, ExchangeMarketData::new(0.0005, 0.000499, 0.000501, 900_000.0)),
    )?;

    Ok(market)
}
