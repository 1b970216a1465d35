use crate::market::{RebasedPairs, TokenAddress};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cache key of a rebased market: target token and depth limit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RebaseKey {
    pub rebase_address: TokenAddress,
    pub max_depth: u8,
}

impl RebaseKey {
    pub fn new(rebase_address: TokenAddress, max_depth: u8) -> Self {
        Self { rebase_address, max_depth }
    }
}

impl Display for RebaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.rebase_address, self.max_depth)
    }
}

/// Key/value store for rebased markets. Must tolerate concurrent `get` and `put`.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &RebaseKey) -> Option<RebasedPairs>;

    fn put(&self, key: RebaseKey, value: RebasedPairs);
}

/// Cached value with its insertion time
#[derive(Clone, Debug)]
pub struct CacheItem<T> {
    pub data: T,
    pub timestamp: Instant,
    pub ttl: Option<Duration>,
}

impl<T> CacheItem<T> {
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        Self { data, timestamp: Instant::now(), ttl }
    }

    pub fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|ttl| self.timestamp.elapsed() > ttl)
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 { 0.0 } else { hits as f64 / total as f64 }
    }
}

/// In-memory [`ResultCache`]. Entries live until their TTL passes, if one is set, or until invalidated.
#[derive(Debug, Default)]
pub struct RebaseCache {
    markets: DashMap<RebaseKey, CacheItem<RebasedPairs>>,
    pub stats: CacheStats,
    ttl: Option<Duration>,
}

impl RebaseCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { markets: DashMap::new(), stats: CacheStats::default(), ttl }
    }

    /// Drop every cached depth for one target token
    pub fn invalidate_token(&self, rebase_address: &TokenAddress) {
        let before = self.markets.len();
        self.markets.retain(|key, _| key.rebase_address != *rebase_address);
        self.stats.evictions.fetch_add((before.saturating_sub(self.markets.len())) as u64, Ordering::Relaxed);
    }

    pub fn cleanup_expired(&self) {
        self.markets.retain(|_, item| {
            let expired = item.is_expired();
            if expired {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
            !expired
        });
    }

    pub fn clear(&self) {
        self.markets.clear();
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl ResultCache for RebaseCache {
    fn get(&self, key: &RebaseKey) -> Option<RebasedPairs> {
        if let Some(item) = self.markets.get(key) {
            if !item.is_expired() {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(item.data.clone());
            }
        }
        // expired entries are removed outside of the read guard
        if self.markets.remove_if(key, |_, item| item.is_expired()).is_some() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, key: RebaseKey, value: RebasedPairs) {
        self.markets.insert(key, CacheItem::new(value, self.ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Pair, PairId};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn rebased_pairs() -> RebasedPairs {
        let pair = Pair::new("0xdai", "0xeth", "DAI", "ETH");
        let pairs: HashMap<PairId, Pair> = HashMap::from([(pair.id(), pair)]);
        Arc::new(pairs)
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = RebaseCache::default();
        let key = RebaseKey::new("0xeth".into(), 2);

        assert!(cache.get(&key).is_none());

        let value = rebased_pairs();
        cache.put(key.clone(), value.clone());
        let cached = cache.get(&key).unwrap();
        assert!(Arc::ptr_eq(&cached, &value));

        // a different depth is a different entry
        assert!(cache.get(&RebaseKey::new("0xeth".into(), 3)).is_none());

        assert_eq!(cache.stats.hits.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats.misses.load(Ordering::Relaxed), 2);
        assert!((cache.stats.hit_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cache_ttl_expiry() {
        let cache = RebaseCache::new(Some(Duration::ZERO));
        let key = RebaseKey::new("0xeth".into(), 2);
        cache.put(key.clone(), rebased_pairs());

        std::thread::sleep(Duration::from_millis(2));

        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats.evictions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_invalidate_token() {
        let cache = RebaseCache::default();
        cache.put(RebaseKey::new("0xeth".into(), 1), rebased_pairs());
        cache.put(RebaseKey::new("0xeth".into(), 2), rebased_pairs());
        cache.put(RebaseKey::new("0xdai".into(), 2), rebased_pairs());

        cache.invalidate_token(&"0xeth".into());

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&RebaseKey::new("0xdai".into(), 2)).is_some());
        assert_eq!(cache.stats.evictions.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = RebaseCache::new(Some(Duration::ZERO));
        cache.put(RebaseKey::new("0xeth".into(), 2), rebased_pairs());
        std::thread::sleep(Duration::from_millis(2));

        cache.cleanup_expired();
        assert!(cache.is_empty());

        cache.put(RebaseKey::new("0xeth".into(), 2), rebased_pairs());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_put_and_get() {
        let cache = Arc::new(RebaseCache::default());
        let handles: Vec<_> = (0..8u8)
            .map(|depth| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let key = RebaseKey::new("0xeth".into(), depth);
                    cache.put(key.clone(), rebased_pairs());
                    cache.get(&key).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 8);
    }
}
