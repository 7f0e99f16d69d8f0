//! Ordered Map Module
//!
//! Generic insertion-ordered map: HashMap storage plus a VecDeque tracking
//! key order. This is the container base shared by the bounded cache and by
//! the ordered collections returned from batch fetches.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

// == Ordered Map ==
/// A mapping that preserves insertion order.
///
/// Keys are stored in a VecDeque where:
/// - Front = least recently inserted (oldest)
/// - Back = most recently inserted
///
/// Re-inserting an existing key updates the value in place and keeps the
/// key's original position.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// Keys in insertion order
    order: VecDeque<K>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty ordered map.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    // == Insert ==
    /// Inserts or updates a mapping.
    ///
    /// A new key is appended at the back; an existing key keeps its
    /// position. Returns the displaced value for an existing key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let displaced = self.entries.insert(key.clone(), value);
        if displaced.is_none() {
            self.order.push_back(key);
        }
        displaced
    }

    // == Get ==
    /// Returns a reference to the value for `key`, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    // == Remove ==
    /// Removes a mapping, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    // == Pop First ==
    /// Removes and returns the oldest mapping.
    ///
    /// Returns None if the map is empty.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let key = self.order.pop_front()?;
        let value = self.entries.remove(&key)?;
        Some((key, value))
    }

    // == First Key ==
    /// Returns the oldest surviving key without removing it.
    pub fn first_key(&self) -> Option<&K> {
        self.order.front()
    }

    // == Contains ==
    /// Checks whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Iteration ==
    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k, v)))
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
