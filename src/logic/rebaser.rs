use super::calculator::{rebase_pair_bounded, shallow_rebase_pair};
use super::types::{PairStats, RebaserStats};
use crate::error::RebaseError;
use crate::market::{Market, Pair, PairId, RebaseConfig, RebasedMarket, RebasedPairs, TokenAddress};
use crate::utils::cache::{RebaseCache, RebaseKey, ResultCache};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{self, JoinSet};
use tokio::time;
use tracing::{debug, error, info, warn};

/// Rebasing engine
///
/// Turns a market snapshot into the same set of pairs with every rate expressed in a target token.
/// Each pair is rebased by its own worker on the blocking pool, bounded by `max_concurrency` and a
/// per-worker timeout. A request either yields every pair or fails as a whole.
///
/// Results are stored in the injected [`ResultCache`] under `(target, depth)`. Concurrent requests for
/// the same key are coalesced so only one of them computes.
pub struct Rebaser {
    config: RebaseConfig,
    worker_timeout: Duration,
    cache: Arc<dyn ResultCache>,
    workers: Arc<Semaphore>,
    in_flight: DashMap<RebaseKey, Arc<Mutex<()>>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    computed_markets: AtomicU64,
}

impl Rebaser {
    pub fn builder() -> RebaserBuilder {
        RebaserBuilder::new()
    }

    pub fn config(&self) -> &RebaseConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// Rebase every pair of `market` into `rebase_address`, following paths of at most `max_depth` pairs.
    pub async fn rebase_market(&self, rebase_address: &TokenAddress, market: Arc<Market>, max_depth: u8) -> Result<RebasedMarket, RebaseError> {
        let key = RebaseKey::new(rebase_address.clone(), max_depth);
        if let Some(pairs) = self.cached(&key) {
            return Ok(RebasedMarket::new(rebase_address.clone(), pairs));
        }

        // declared before the flight so it is dropped after it, also when this future is cancelled
        let _cleanup = InFlightCleanup { in_flight: &self.in_flight, key: &key };
        let flight = self.in_flight.entry(key.clone()).or_default().clone();
        let _guard = flight.lock().await;

        let pairs = match self.cached(&key) {
            Some(pairs) => pairs,
            None => self.compute_market(&key, market).await?,
        };
        Ok(RebasedMarket::new(rebase_address.clone(), pairs))
    }

    pub async fn rebase_market_default_depth(&self, rebase_address: &TokenAddress, market: Arc<Market>) -> Result<RebasedMarket, RebaseError> {
        self.rebase_market(rebase_address, market, self.config.max_depth).await
    }

    /// Deep-rebase a single pair without touching the cache
    pub fn rebase_pair(&self, pair: &Pair, rebase_address: &TokenAddress, market: &Market, max_depth: u8) -> Result<Pair, RebaseError> {
        rebase_pair_bounded(pair, rebase_address, market, max_depth, self.config.max_search_states)
    }

    /// Rebase a single pair through its direct pair with `rebase_address` only
    pub fn shallow_rebase_pair(&self, pair: &Pair, rebase_address: &TokenAddress, market: &Market) -> Pair {
        shallow_rebase_pair(pair, rebase_address, market)
    }

    pub fn pair_stats(&self, pair: &Pair) -> PairStats {
        PairStats::from(pair)
    }

    /// Get statistics about the engine's current state
    pub fn get_statistics(&self) -> RebaserStats {
        RebaserStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            computed_markets: self.computed_markets.load(Ordering::Relaxed),
            in_flight: self.in_flight.len(),
            max_concurrency: self.config.max_concurrency,
            default_max_depth: self.config.max_depth,
            worker_timeout: self.worker_timeout,
        }
    }

    fn cached(&self, key: &RebaseKey) -> Option<RebasedPairs> {
        let pairs = self.cache.get(key)?;
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        debug!(%key, pairs = pairs.len(), "Rebased market served from cache");
        Some(pairs)
    }

    async fn compute_market(&self, key: &RebaseKey, market: Arc<Market>) -> Result<RebasedPairs, RebaseError> {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, pairs = market.len(), "Rebased market not cached, computing");
        let started = Instant::now();

        let mut workers = JoinSet::new();
        for pair in market.pairs().values() {
            workers.spawn(Self::rebase_worker(
                pair.clone(),
                key.clone(),
                market.clone(),
                self.workers.clone(),
                self.worker_timeout,
                self.config.max_search_states,
            ));
        }

        let mut pairs = HashMap::with_capacity(market.len());
        while let Some(joined) = workers.join_next().await {
            match joined.map_err(RebaseError::TaskFailed).and_then(|outcome| outcome) {
                Ok((pair_id, rebased)) => {
                    pairs.insert(pair_id, rebased);
                }
                Err(err) => {
                    workers.abort_all();
                    if err.is_timeout() {
                        warn!(%key, %err, "Rebase aborted");
                    } else {
                        error!(%key, %err, "Rebase aborted");
                    }
                    return Err(err);
                }
            }
        }

        let pairs = Arc::new(pairs);
        self.cache.put(key.clone(), pairs.clone());
        self.computed_markets.fetch_add(1, Ordering::Relaxed);
        info!(%key, pairs = pairs.len(), elapsed = ?started.elapsed(), "Rebased market");

        Ok(pairs)
    }

    async fn rebase_worker(
        pair: Pair,
        key: RebaseKey,
        market: Arc<Market>,
        workers: Arc<Semaphore>,
        timeout: Duration,
        max_states: usize,
    ) -> Result<(PairId, Pair), RebaseError> {
        let pair_id = pair.id();
        let permit = workers.acquire_owned().await.map_err(|_| RebaseError::PoolClosed)?;

        let worker = task::spawn_blocking(move || {
            let _permit = permit;
            rebase_pair_bounded(&pair, &key.rebase_address, &market, key.max_depth, max_states)
        });

        match time::timeout(timeout, worker).await {
            Ok(Ok(rebased)) => Ok((pair_id, rebased?)),
            Ok(Err(source)) => Err(RebaseError::WorkerFailed { pair_id, source }),
            Err(_) => Err(RebaseError::WorkerTimeout { pair_id, timeout }),
        }
    }
}

/// Drops the per-key flight entry once no other request waits on it
struct InFlightCleanup<'a> {
    in_flight: &'a DashMap<RebaseKey, Arc<Mutex<()>>>,
    key: &'a RebaseKey,
}

impl Drop for InFlightCleanup<'_> {
    fn drop(&mut self) {
        self.in_flight.remove_if(self.key, |_, flight| Arc::strong_count(flight) == 1);
    }
}

/// Builder pattern for creating and configuring a Rebaser
pub struct RebaserBuilder {
    config: RebaseConfig,
    cache: Option<Arc<dyn ResultCache>>,
    worker_timeout: Option<Duration>,
}

impl RebaserBuilder {
    pub fn new() -> Self {
        Self { config: RebaseConfig::default(), cache: None, worker_timeout: None }
    }

    pub fn with_config(mut self, config: RebaseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = Some(timeout);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn with_default_max_depth(mut self, max_depth: u8) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_max_search_states(mut self, max_search_states: usize) -> Self {
        self.config.max_search_states = max_search_states;
        self
    }

    pub fn build(self) -> Result<Rebaser, RebaseError> {
        self.config.validate()?;

        let cache = self.cache.unwrap_or_else(|| Arc::new(RebaseCache::new(self.config.cache_ttl())));
        let worker_timeout = self.worker_timeout.unwrap_or_else(|| self.config.worker_timeout());

        Ok(Rebaser {
            workers: Arc::new(Semaphore::new(self.config.max_concurrency)),
            config: self.config,
            worker_timeout,
            cache,
            in_flight: DashMap::new(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            computed_markets: AtomicU64::new(0),
        })
    }
}

impl Default for RebaserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
