use crate::market::PairId;
use crate::utils::config_loader::LoadConfigError;
use std::time::Duration;
use tokio::task::JoinError;

/// Failure of a whole market rebase. A failed request never yields a partial market.
#[derive(Debug, thiserror::Error)]
pub enum RebaseError {
    #[error("rebase of pair {pair_id} did not finish within {timeout:?}")]
    WorkerTimeout { pair_id: PairId, timeout: Duration },
    #[error("rebase worker for pair {pair_id} failed: {source}")]
    WorkerFailed {
        pair_id: PairId,
        #[source]
        source: JoinError,
    },
    #[error("path search for pair {pair_id} expanded more than {limit} states")]
    SearchLimitExceeded { pair_id: PairId, limit: usize },
    #[error("rebase task failed: {0}")]
    TaskFailed(#[source] JoinError),
    #[error("rebase worker pool closed")]
    PoolClosed,
    #[error(transparent)]
    Config(#[from] LoadConfigError),
}

impl RebaseError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RebaseError::WorkerTimeout { .. })
    }
}
