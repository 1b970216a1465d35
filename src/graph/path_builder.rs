use super::pair_graph::NeighborIndex;
use super::rebase_path::{Pivot, RebasePath};
use crate::constants::MAX_SEARCH_STATES;
use crate::error::RebaseError;
use crate::market::{PairId, TokenAddress};
use tracing::{debug, error};

/// Find all paths of at most `max_depth` pairs that lead from `start` to a pair whose base is `rebase_address`.
///
/// The search is an exhaustive depth-first traversal that expands the current head through its `pivot`
/// endpoint. A path is complete as soon as its head has the target as base address, which is checked
/// before the depth limit. Paths are neither deduplicated nor pruned, so overlapping routes all count.
/// Neighbors are visited in `PairId` order, which makes the output order deterministic.
///
/// Fails with [`RebaseError::SearchLimitExceeded`] once more than [`MAX_SEARCH_STATES`] states are expanded.
pub fn find_rebase_paths<N: NeighborIndex + ?Sized>(
    index: &N,
    start: &PairId,
    rebase_address: &TokenAddress,
    max_depth: u8,
    pivot: Pivot,
) -> Result<Vec<RebasePath>, RebaseError> {
    find_rebase_paths_bounded(index, start, rebase_address, max_depth, pivot, MAX_SEARCH_STATES)
}

/// [`find_rebase_paths`] with an explicit limit on expanded states.
pub fn find_rebase_paths_bounded<N: NeighborIndex + ?Sized>(
    index: &N,
    start: &PairId,
    rebase_address: &TokenAddress,
    max_depth: u8,
    pivot: Pivot,
    max_states: usize,
) -> Result<Vec<RebasePath>, RebaseError> {
    let mut rebase_paths = Vec::new();
    if max_depth == 0 {
        return Ok(rebase_paths);
    }

    let mut stack = vec![RebasePath::new_first(pivot, *start)];
    let mut searched_state_counter = 0;

    while let Some(current_path) = stack.pop() {
        searched_state_counter += 1;
        // partial path sets are never returned
        if searched_state_counter > max_states {
            error!(%start, %rebase_address, max_depth, %pivot, found = rebase_paths.len(), "Rebase path search exceeded state limit");
            return Err(RebaseError::SearchLimitExceeded { pair_id: *start, limit: max_states });
        }

        let Some(head_id) = current_path.head() else {
            continue;
        };
        let Some(head) = index.pair(head_id) else {
            debug!(pair_id = %head_id, "Pair missing from neighbor index, dropping branch");
            continue;
        };

        if head.base_address == *rebase_address {
            rebase_paths.push(current_path);
            continue;
        }

        if current_path.len() >= max_depth as usize {
            continue;
        }

        // reversed so the smallest neighbor is expanded first
        for neighbor in pivot.neighbors(index, head_id).into_iter().rev() {
            stack.push(current_path.prepend(neighbor));
        }
    }

    Ok(rebase_paths)
}

/// Base-direction and quote-direction paths for one starting pair.
pub fn find_all_rebase_paths<N: NeighborIndex + ?Sized>(
    index: &N,
    start: &PairId,
    rebase_address: &TokenAddress,
    max_depth: u8,
) -> Result<(Vec<RebasePath>, Vec<RebasePath>), RebaseError> {
    find_all_rebase_paths_bounded(index, start, rebase_address, max_depth, MAX_SEARCH_STATES)
}

/// [`find_all_rebase_paths`] with an explicit limit on expanded states per direction.
pub fn find_all_rebase_paths_bounded<N: NeighborIndex + ?Sized>(
    index: &N,
    start: &PairId,
    rebase_address: &TokenAddress,
    max_depth: u8,
    max_states: usize,
) -> Result<(Vec<RebasePath>, Vec<RebasePath>), RebaseError> {
    let base_paths = find_rebase_paths_bounded(index, start, rebase_address, max_depth, Pivot::Base, max_states)?;
    let quote_paths = find_rebase_paths_bounded(index, start, rebase_address, max_depth, Pivot::Quote, max_states)?;
    Ok((base_paths, quote_paths))
}
