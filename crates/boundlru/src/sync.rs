//! Thread-safe wrapper around any [`Store`]
//!
//! ## Locking
//! - `get`, `put`, `remove`: exclusive (write) lock. A hit reorders the
//!   recency list, so a lookup is a mutation.
//! - `size`: shared (read) lock.
//!
//! ## Composition hazard
//! The wrapper always takes its own lock, whatever the wrapped store does
//! internally. Wrapping a store that already synchronizes itself (including
//! another `SyncStore`) is safe but pays two lock acquisitions per call.
//! Pick one layer of synchronization.

use std::fmt;
use std::marker::PhantomData;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lru::LruCache;
use crate::stats::CacheStats;
use crate::store::Store;

/// Boxed store usable behind a [`SyncStore`] from any thread
pub type DynStore<K, V> = Box<dyn Store<K, V> + Send + Sync>;

/// Serializes access to a wrapped store
///
/// Defaults to wrapping an [`LruCache`], so `SyncStore<K, V>` is the shared
/// LRU cache.
pub struct SyncStore<K, V, S = LruCache<K, V>> {
    inner: RwLock<S>,
    stats: CacheStats,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, S> SyncStore<K, V, S>
where
    S: Store<K, V>,
{
    /// Wrap an owned store
    pub fn new(store: S) -> Self {
        debug!(size = store.size(), "wrapping store for shared access");
        Self {
            inner: RwLock::new(store),
            stats: CacheStats::new(),
            _marker: PhantomData,
        }
    }

    /// Wrap a store that may be absent
    ///
    /// # Returns
    /// * `Result<SyncStore>` - Wrapper, or `Error::MissingStore` for `None`
    pub fn try_from_option(store: Option<S>) -> Result<Self> {
        store.map(Self::new).ok_or(Error::MissingStore)
    }

    /// Look up `key` under the exclusive lock
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.write().get(key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Insert or overwrite `key` under the exclusive lock
    pub fn put(&self, key: K, value: V) {
        self.inner.write().put(key, value);
        self.stats.record_insert();
    }

    /// Delete `key` under the exclusive lock
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.inner.write().remove(key);
        if removed {
            self.stats.record_removal();
        }
        removed
    }

    /// Number of live entries, read under the shared lock
    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    /// Whether the wrapped store is empty
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<K, V, S> SyncStore<K, V, S> {
    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Run `f` against the wrapped store under the shared lock
    ///
    /// Only `&S` is handed out, so nothing that reorders entries can run here.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.read())
    }

    /// Unwrap, returning the store
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<K, V> SyncStore<K, V>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    /// Shared LRU cache with the given capacity
    pub fn lru(capacity: usize) -> Result<Self> {
        LruCache::try_new(capacity).map(Self::new)
    }
}

impl<K, V, S> Store<K, V> for SyncStore<K, V, S>
where
    S: Store<K, V>,
{
    fn get(&mut self, key: &K) -> Option<V> {
        SyncStore::get(self, key)
    }

    fn put(&mut self, key: K, value: V) {
        SyncStore::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> bool {
        SyncStore::remove(self, key)
    }

    fn size(&self) -> usize {
        SyncStore::size(self)
    }
}

impl<K, V, S> fmt::Debug for SyncStore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStore")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sync_basic() {
        let cache: SyncStore<u64, String> = SyncStore::lru(2).unwrap();

        cache.put(1, "a".to_string());
        cache.put(2, "b".to_string());
        assert_eq!(cache.get(&1), Some("a".to_string()));

        cache.put(3, "c".to_string()); // evicts 2
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.size(), 2);

        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().inserts(), 3);
    }

    #[test]
    fn test_sync_remove() {
        let cache: SyncStore<u64, u64> = SyncStore::lru(4).unwrap();

        cache.put(7, 70);
        assert!(cache.remove(&7));
        assert!(!cache.remove(&7));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().removals(), 1);
    }

    #[test]
    fn test_missing_store_rejected() {
        let result = SyncStore::<u64, u64, LruCache<u64, u64>>::try_from_option(None);
        assert!(matches!(result, Err(Error::MissingStore)));

        let present: Result<SyncStore<u64, u64>> =
            SyncStore::try_from_option(Some(LruCache::new(1)));
        assert!(present.is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SyncStore::<u64, u64>::lru(0),
            Err(Error::ZeroCapacity)
        ));
    }

    #[test]
    fn test_wraps_trait_object() {
        let boxed: DynStore<&'static str, i32> = Box::new(LruCache::new(2));
        let cache = SyncStore::new(boxed);

        cache.put("one", 1);
        cache.put("two", 2);
        cache.put("three", 3);

        assert_eq!(cache.get(&"one"), None);
        assert_eq!(cache.get(&"two"), Some(2));
        assert_eq!(cache.get(&"three"), Some(3));
    }

    #[test]
    fn test_double_wrap_still_correct() {
        let inner: SyncStore<u32, u32> = SyncStore::lru(2).unwrap();
        let outer = SyncStore::new(inner);

        outer.put(1, 1);
        outer.put(2, 2);
        outer.get(&1);
        outer.put(3, 3);

        assert_eq!(outer.get(&2), None);
        assert_eq!(outer.size(), 2);
        // Both layers count the same traffic.
        let inner = outer.into_inner();
        assert_eq!(inner.stats().inserts(), 3);
    }

    #[test]
    fn test_with_store_sees_recency() {
        let cache: SyncStore<u32, u32> = SyncStore::lru(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&1);

        let order: Vec<u32> = cache.with_store(|lru| lru.iter().map(|(k, _)| *k).collect());
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_threads_share_cache() {
        let cache: Arc<SyncStore<u64, u64>> = Arc::new(SyncStore::lru(1000).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = t * 1000 + i;
                        cache.put(key, i);
                        assert_eq!(cache.get(&key), Some(i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 400);
        cache.with_store(|lru| lru.check_invariants()).unwrap();
    }
}
