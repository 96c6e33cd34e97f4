//! LRU (Least Recently Used) cache implementation
//!
//! Nodes live in a slab (`Vec<Option<Node>>`) and are linked by index into a
//! doubly-linked recency list, so promotion and eviction are O(1) without
//! unsafe pointer juggling. The index map points each key at its slot.
//!
//! ```text
//!   map: key -> slot
//!
//!   head (MRU)                                   tail (LRU)
//!     [slot 3] <-> [slot 0] <-> [slot 5] <-> [slot 1]
//!
//!   free_list: [2, 4]   (vacated slots reused before the slab grows)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::store::Store;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache with fixed capacity
///
/// Not synchronized. Wrap it in a [`SyncStore`](crate::SyncStore) to share
/// it between threads.
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Panics
    /// Panics if `capacity` is 0. Use [`LruCache::try_new`] for
    /// user-supplied capacities.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create a new LRU cache, rejecting a zero capacity
    ///
    /// # Returns
    /// * `Result<LruCache>` - Empty cache, or `Error::ZeroCapacity`
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        debug!(capacity, "creating lru cache");

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        })
    }

    /// Get a value from the cache, promoting it to most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Get a value without touching its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Check for a key without touching its recency
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert a key-value pair into the cache
    ///
    /// Overwriting an existing key never evicts. Inserting a new key into a
    /// full cache evicts exactly the least recently used entry first.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict();
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: self.head,
        });
        self.link_front(idx);
        self.map.insert(key, idx);
    }

    /// Remove a key, returning its value
    pub fn take(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free_node(idx);
        self.nodes[idx].take().map(|node| node.value)
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// The least recently used entry, without promoting it
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let idx = self.tail?;
        self.nodes[idx].as_ref().map(|node| (&node.key, &node.value))
    }

    /// Iterate entries from most to least recently used without promotion
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Verify that the index, slab, and recency list agree
    ///
    /// Walks the whole list, so this is O(n). Meant for tests and debugging.
    pub fn check_invariants(&self) -> Result<()> {
        if self.map.len() > self.capacity {
            return Err(Error::Invariant(format!(
                "len {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }

        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.nodes[idx]
                .as_ref()
                .ok_or_else(|| Error::Invariant(format!("slot {} linked but empty", idx)))?;
            if node.prev != prev {
                return Err(Error::Invariant(format!("slot {} has a stale prev link", idx)));
            }
            if self.map.get(&node.key) != Some(&idx) {
                return Err(Error::Invariant(format!("slot {} is not indexed", idx)));
            }
            count += 1;
            if count > self.map.len() {
                return Err(Error::Invariant("recency list is longer than index".into()));
            }
            prev = Some(idx);
            cursor = node.next;
        }

        if self.tail != prev {
            return Err(Error::Invariant("tail does not end the recency list".into()));
        }
        if count != self.map.len() {
            return Err(Error::Invariant(format!(
                "recency list has {} nodes, index has {}",
                count,
                self.map.len()
            )));
        }
        let occupied = self.nodes.iter().filter(|slot| slot.is_some()).count();
        if occupied != count {
            return Err(Error::Invariant(format!(
                "{} occupied slots for {} entries",
                occupied, count
            )));
        }
        Ok(())
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        if let Some(node) = &mut self.nodes[idx] {
            node.next = self.head;
        }
        self.link_front(idx);
    }

    /// Attach an already-populated, detached node at the head
    fn link_front(&mut self, idx: usize) {
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &mut self.nodes[idx] {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn evict(&mut self) {
        let Some(tail_idx) = self.tail else {
            return;
        };
        // Unlink while the node is still in its slot so the neighbours are reachable.
        self.unlink(tail_idx);
        if let Some(node) = self.nodes[tail_idx].take() {
            self.map.remove(&node.key);
            self.free_node(tail_idx);
            trace!(slot = tail_idx, capacity = self.capacity, "evicted lru entry");
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}

impl<K, V> Store<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        LruCache::get(self, key).cloned()
    }

    fn put(&mut self, key: K, value: V) {
        LruCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> bool {
        LruCache::remove(self, key)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes[self.cursor?].as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
