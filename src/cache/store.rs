//! Cache Store Module
//!
//! Capacity-bounded message cache: wraps the ordered map with an
//! oldest-first eviction policy.

use tracing::debug;

use crate::cache::OrderedMap;
use crate::models::{MessageId, SharedMessage};

// == Capacity ==
/// Capacity policy for the message cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// No bound; nothing is ever evicted
    Unbounded,
    /// At most this many entries. `Limit(0)` disables the cache entirely:
    /// nothing is stored, though fetched entities are still returned.
    Limit(usize),
}

impl Capacity {
    /// True when the cache stores nothing at all.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Capacity::Limit(0))
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Limit(crate::cache::DEFAULT_MAXIMUM_CACHE_SIZE)
    }
}

// == Message Cache ==
/// Insertion-ordered cache of messages with a capacity bound.
///
/// Eviction is strictly by insertion order (oldest first), not by access
/// recency. The cache wraps [`OrderedMap`] rather than extending it; the
/// wrapper owns the capacity policy and nothing else.
#[derive(Debug, Default)]
pub struct MessageCache {
    /// Underlying ordered storage
    entries: OrderedMap<MessageId, SharedMessage>,
    /// Capacity policy
    capacity: Capacity,
}

impl MessageCache {
    // == Constructor ==
    /// Creates an empty cache with the given capacity policy.
    pub fn new(capacity: Capacity) -> Self {
        Self {
            entries: OrderedMap::new(),
            capacity,
        }
    }

    // == Insert ==
    /// Inserts or updates a message, evicting oldest entries first when full.
    ///
    /// With `Capacity::Limit(0)` this is a no-op: the caller keeps the
    /// message, the cache retains nothing. Updating an existing key never
    /// triggers eviction and keeps the key's position. Eviction loops until
    /// the cache is within bound, so a capacity lowered at runtime cannot
    /// leave the cache over-bound after the next insert.
    pub fn insert(&mut self, id: MessageId, message: SharedMessage) {
        let max = match self.capacity {
            Capacity::Unbounded => {
                self.entries.insert(id, message);
                return;
            }
            Capacity::Limit(0) => return,
            Capacity::Limit(max) => max,
        };

        if !self.entries.contains_key(&id) {
            while self.entries.len() >= max {
                match self.entries.pop_first() {
                    Some((evicted, _)) => {
                        debug!(id = %evicted, "evicted oldest cached message");
                    }
                    None => break,
                }
            }
        }

        self.entries.insert(id, message);
    }

    // == Get ==
    /// Returns the cached message for `id`, if present.
    pub fn get(&self, id: &MessageId) -> Option<SharedMessage> {
        self.entries.get(id).cloned()
    }

    // == Remove ==
    /// Removes a message from the cache. Absent keys are not an error.
    pub fn remove(&mut self, id: &MessageId) -> Option<SharedMessage> {
        self.entries.remove(id)
    }

    // == First Key ==
    /// Returns the oldest surviving key, the next eviction candidate.
    pub fn first_key(&self) -> Option<&MessageId> {
        self.entries.first_key()
    }

    // == Contains ==
    /// Checks whether `id` is cached.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    // == Length ==
    /// Returns the number of cached messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Iteration ==
    /// Iterates over cached messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&MessageId, &SharedMessage)> {
        self.entries.iter()
    }

    // == Capacity ==
    /// The current capacity policy.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Replaces the capacity policy, trimming oldest entries immediately
    /// if the new bound is smaller than the current size.
    pub fn set_capacity(&mut self, capacity: Capacity) {
        self.capacity = capacity;
        if let Capacity::Limit(max) = capacity {
            while self.entries.len() > max {
                if let Some((evicted, _)) = self.entries.pop_first() {
                    debug!(id = %evicted, "trimmed cached message after capacity change");
                } else {
                    break;
                }
            }
        }
    }
}
