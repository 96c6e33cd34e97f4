//! Cache configuration
//!
//! ```json
//! { "capacity": 4096, "synchronized": true }
//! ```
//!
//! Missing fields fall back to [`CacheConfig::default`].

use std::fs;
use std::hash::Hash;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::lru::LruCache;
use crate::store::Store;
use crate::sync::SyncStore;

/// Default cache capacity (number of items)
pub const DEFAULT_CAPACITY: usize = 1024;

/// How to build a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// Put the cache behind a [`SyncStore`]
    pub synchronized: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            synchronized: true,
        }
    }
}

impl CacheConfig {
    /// Config with the given capacity and default locking
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Reject configurations no cache can be built from
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(?path, ?config, "loaded cache config");
        Ok(config)
    }

    /// Build the configured cache
    pub fn build<K, V>(&self) -> Result<AnyStore<K, V>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        self.validate()?;
        let lru = LruCache::try_new(self.capacity)?;
        Ok(if self.synchronized {
            AnyStore::Shared(SyncStore::new(lru))
        } else {
            AnyStore::Local(lru)
        })
    }
}

/// A cache built from a [`CacheConfig`]
///
/// Exactly one layer of synchronization: none for `Local`, the wrapper's
/// lock for `Shared`.
#[derive(Debug)]
pub enum AnyStore<K, V> {
    /// Bare LRU, single-threaded use
    Local(LruCache<K, V>),
    /// LRU behind a [`SyncStore`]
    Shared(SyncStore<K, V>),
}

impl<K, V> AnyStore<K, V> {
    /// Whether this cache can be shared between threads
    pub fn is_synchronized(&self) -> bool {
        matches!(self, AnyStore::Shared(_))
    }

    /// The shared wrapper, if this cache has one
    pub fn into_shared(self) -> Option<SyncStore<K, V>> {
        match self {
            AnyStore::Shared(store) => Some(store),
            AnyStore::Local(_) => None,
        }
    }
}

impl<K, V> Store<K, V> for AnyStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        match self {
            AnyStore::Local(lru) => Store::get(lru, key),
            AnyStore::Shared(shared) => shared.get(key),
        }
    }

    fn put(&mut self, key: K, value: V) {
        match self {
            AnyStore::Local(lru) => lru.put(key, value),
            AnyStore::Shared(shared) => shared.put(key, value),
        }
    }

    fn remove(&mut self, key: &K) -> bool {
        match self {
            AnyStore::Local(lru) => lru.remove(key),
            AnyStore::Shared(shared) => shared.remove(key),
        }
    }

    fn size(&self) -> usize {
        match self {
            AnyStore::Local(lru) => lru.len(),
            AnyStore::Shared(shared) => shared.size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.synchronized);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = CacheConfig::from_json_str(r#"{"capacity": 0}"#).unwrap_err();
        assert!(matches!(err, Error::ZeroCapacity));
        assert!(CacheConfig::with_capacity(0).build::<u32, u32>().is_err());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = CacheConfig::from_json_str(r#"{"capacity": -4}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CacheConfig::from_json_str(r#"{"ttl": 30}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_build_local_and_shared() {
        let local = CacheConfig {
            capacity: 2,
            synchronized: false,
        };
        let mut cache = local.build::<&str, i32>().unwrap();
        assert!(!cache.is_synchronized());
        cache.put("one", 1);
        cache.put("two", 2);
        cache.put("three", 3);
        assert_eq!(cache.get(&"one"), None);
        assert_eq!(cache.size(), 2);

        let shared = CacheConfig::with_capacity(2)
            .build::<&str, i32>()
            .unwrap()
            .into_shared()
            .unwrap();
        shared.put("one", 1);
        assert_eq!(shared.get(&"one"), Some(1));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"capacity": 8, "synchronized": false}}"#).unwrap();

        let config = CacheConfig::from_file(file.path()).unwrap();
        assert_eq!(config.capacity, 8);
        assert!(!config.synchronized);

        assert!(matches!(
            CacheConfig::from_file(file.path().with_extension("missing")),
            Err(Error::Io(_))
        ));
    }
}
