//! A bounded map that evicts the least recently touched entry.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::mem;
use core::num::NonZeroUsize;

use crate::hash::HashMap;

const NIL: usize = usize::MAX;

struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

// -----------------------------------------------------------------------------
// LruCache

/// A bounded map ordered by recency of access.
///
/// Entries live in a slab linked from most to least recently touched.
/// Both [`get`](Self::get) and [`insert`](Self::insert) count as a touch,
/// [`peek`](Self::peek) does not. Once `capacity` entries are stored,
/// inserting a new key evicts the least recently *touched* entry, not the
/// oldest inserted one.
///
/// The cache is not synchronized; owners wrap it in a lock.
///
/// # Examples
///
/// ```
/// use core::num::NonZeroUsize;
/// use pax_utils::LruCache;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.insert("a", 1);
/// cache.insert("b", 2);
///
/// // touching `a` makes `b` the eviction candidate
/// assert_eq!(cache.get("a"), Some(&1));
/// assert_eq!(cache.insert("c", 3), Some(("b", 2)));
///
/// assert!(cache.contains("a"));
/// assert!(!cache.contains("b"));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct LruCache<K, V> {
    index: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    head: usize,
    tail: usize,
    capacity: NonZeroUsize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            index: HashMap::default(),
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if the key is cached. Does not touch the entry.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Returns the cached value without touching it.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        Some(&self.nodes[slot].value)
    }

    /// Returns the cached value and marks it as most recently touched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        self.touch(slot);
        Some(&self.nodes[slot].value)
    }

    /// Inserts or replaces a value and marks it as most recently touched.
    ///
    /// Returns the entry evicted to make room, if any.
    /// Replacing the value of a cached key never evicts.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            self.nodes[slot].value = value;
            self.touch(slot);
            return None;
        }

        if self.nodes.len() < self.capacity.get() {
            let slot = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.index.insert(key, slot);
            self.push_front(slot);
            return None;
        }

        // Reuse the slot of the least recently touched entry.
        let slot = self.tail;
        self.unlink(slot);
        let node = &mut self.nodes[slot];
        let old_key = mem::replace(&mut node.key, key.clone());
        let old_value = mem::replace(&mut node.value, value);
        self.index.remove(&old_key);
        self.index.insert(key, slot);
        self.push_front(slot);
        Some((old_key, old_value))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Iterates from the most to the least recently touched entry.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let node = &self.nodes[cursor];
            cursor = node.next;
            Some((&node.key, &node.value))
        })
    }

    fn touch(&mut self, slot: usize) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn unlink(&mut self, slot: usize) {
        let Node { prev, next, .. } = self.nodes[slot];
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
    }

    fn push_front(&mut self, slot: usize) {
        let head = self.head;
        let node = &mut self.nodes[slot];
        node.prev = NIL;
        node.next = head;
        if head != NIL {
            self.nodes[head].prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }
}

impl<K: fmt::Debug + Hash + Eq + Clone, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
