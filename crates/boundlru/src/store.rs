//! The capability set shared by every cache store
//!
//! Anything implementing [`Store`] can sit behind a [`SyncStore`](crate::SyncStore),
//! be swapped for another eviction policy, or be replaced by a test double
//! without touching call sites.

/// Minimal cache contract: get, put, remove, size
///
/// `get` takes `&mut self` because a hit may reorder internal state
/// (an LRU promotes the key). Values are returned by clone so the
/// contract works across lock guards and trait objects.
pub trait Store<K, V> {
    /// Look up `key`, returning a copy of its value if present
    fn get(&mut self, key: &K) -> Option<V>;

    /// Insert or overwrite `key`
    fn put(&mut self, key: K, value: V);

    /// Delete `key`, returning whether anything was removed
    fn remove(&mut self, key: &K) -> bool;

    /// Number of live entries
    fn size(&self) -> usize;

    /// Whether the store holds no entries
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<K, V, S> Store<K, V> for Box<S>
where
    S: Store<K, V> + ?Sized,
{
    fn get(&mut self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn put(&mut self, key: K, value: V) {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &K) -> bool {
        (**self).remove(key)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}
