//! # boundlru
//!
//! Bounded least-recently-used cache with a separate thread-safety layer.
//!
//! ## Architecture
//! - **Store**: the capability set {get, put, remove, size} every cache implements
//! - **LruCache**: AHash index + slab-backed doubly-linked recency list, O(1) per op
//! - **SyncStore**: wraps any `Store` behind a `parking_lot::RwLock`
//! - **CacheConfig**: serde config choosing capacity and whether to wrap
//!
//! ```
//! use boundlru::{LruCache, SyncStore};
//!
//! let cache: SyncStore<&str, i32> = SyncStore::new(LruCache::new(2));
//! cache.put("one", 1);
//! cache.put("two", 2);
//! cache.put("three", 3);
//!
//! assert_eq!(cache.get(&"one"), None);
//! assert_eq!(cache.get(&"two"), Some(2));
//! assert_eq!(cache.size(), 2);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod lru;
mod stats;
mod store;
mod sync;

pub use config::{AnyStore, CacheConfig, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use lru::{Iter, LruCache};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::Store;
pub use sync::{DynStore, SyncStore};
