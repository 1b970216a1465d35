pub mod pair_graph;
pub mod path_builder;
pub mod rebase_path;

pub use pair_graph::{FastHashMap, NeighborIndex, PairGraph};
pub use path_builder::{find_all_rebase_paths, find_all_rebase_paths_bounded, find_rebase_paths, find_rebase_paths_bounded};
pub use rebase_path::{Pivot, RebasePath};
