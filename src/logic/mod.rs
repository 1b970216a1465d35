/// Logic Layer - Rebasing Engine
///
/// This layer is responsible for:
/// - Direct conversion of a rate through the pair between two tokens
/// - Volume-weighted rebasing of a pair across every discovered path
/// - Fanning a whole market out to bounded workers and caching the result
pub mod calculator;
pub mod converter;
pub mod rebaser;
pub mod types;


pub use calculator::{RebaseCalculator, deep_rebase, path_weight, rebase_pair, rebase_pair_bounded, rebased_path_rate, shallow_rebase_pair};
pub use converter::{convert, shallow_rebase, try_convert};
pub use rebaser::{Rebaser, RebaserBuilder};
pub use types::{PairStats, RebaserStats};
