// Layers
pub mod market; // Data Layer: tokens, pairs, market snapshots, configuration
pub mod graph; // Neighbor index and rebase path discovery
pub mod logic; // Logic Layer: conversion, weighted rebasing, the rebasing engine

// Common utilities and types
pub mod constants;
pub mod error;
pub mod utils;

// Re-export key components from each layer
pub use error::RebaseError;
pub use graph::{
    NeighborIndex, PairGraph, Pivot, RebasePath, find_all_rebase_paths, find_all_rebase_paths_bounded, find_rebase_paths, find_rebase_paths_bounded,
};
pub use logic::{
    PairStats, RebaseCalculator, Rebaser, RebaserBuilder, RebaserStats, convert, deep_rebase, rebase_pair, rebase_pair_bounded,
    shallow_rebase, shallow_rebase_pair, try_convert,
};
pub use market::{Exchange, ExchangeMarketData, Market, Pair, PairId, RateField, RebaseConfig, RebasedMarket, RebasedPairs, TokenAddress};
pub use utils::{CacheStats, ConfigLoader, ConfigLoaderSync, LoadConfigError, RebaseCache, RebaseKey, ResultCache};
