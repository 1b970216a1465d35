/// Path length limit used when no depth is requested. Path counts grow exponentially with depth.
pub const DEFAULT_MAX_DEPTH: u8 = 2;

/// Upper bound for one pair computation inside a market rebase.
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 60;

/// Sanity limit on DFS states expanded for a single path search.
pub const MAX_SEARCH_STATES: usize = 500_000;
