use criterion::{Criterion, criterion_group, criterion_main};
use lazy_static::lazy_static;
use market_rebase::{Exchange, ExchangeMarketData, Market, Pair, Pivot, TokenAddress, find_all_rebase_paths, find_rebase_paths};
use std::hint::black_box;

lazy_static! {
    static ref WETH: TokenAddress = TokenAddress::repeat_byte(0x01);
    static ref USDC: TokenAddress = TokenAddress::repeat_byte(0x02);
}

// every token trades against WETH and USDC, plus a chain between neighbouring tokens
fn hub_market(tokens: u8) -> eyre::Result<(Market, Pair)> {
    let data = ExchangeMarketData::new(1.0, 0.99, 1.01, 100.0);
    let mut pairs = Vec::new();
    let mut previous: Option<TokenAddress> = None;

    for i in 0..tokens {
        let token = TokenAddress::repeat_byte(0x10 + i);
        let symbol = format!("T{i}");
        pairs.push(Pair::new(WETH.clone(), token.clone(), "WETH", &symbol).with_market_data(Exchange::Uniswap, data));
        pairs.push(Pair::new(token.clone(), USDC.clone(), &symbol, "USDC").with_market_data(Exchange::Kyber, data));
        if let Some(previous) = previous {
            pairs.push(Pair::new(previous, token.clone(), "PREV", &symbol).with_market_data(Exchange::Oasis, data));
        }
        previous = Some(token);
    }

    let start = Pair::new(TokenAddress::repeat_byte(0x10), USDC.clone(), "T0", "USDC");
    Ok((Market::from_pairs(pairs)?, start))
}

fn benchmark_find_rebase_paths(c: &mut Criterion) {
    let (market, start) = hub_market(64).unwrap();
    let start_id = start.id();

    let mut group = c.benchmark_group("find_rebase_paths");
    for depth in [2u8, 3, 4] {
        group.bench_function(format!("base_depth_{depth}"), |b| {
            b.iter(|| find_rebase_paths(black_box(&market), black_box(&start_id), black_box(&WETH), black_box(depth), Pivot::Base))
        });
        group.bench_function(format!("both_depth_{depth}"), |b| {
            b.iter(|| find_all_rebase_paths(black_box(&market), black_box(&start_id), black_box(&WETH), black_box(depth)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_find_rebase_paths);
criterion_main!(benches);
