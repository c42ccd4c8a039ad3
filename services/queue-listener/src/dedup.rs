//! Per-listener duplicate suppression with a bounded key set.

use std::collections::{HashSet, VecDeque};

/// Insertion-ordered key set owned by a single listener, created at listener
/// start and torn down with it.
///
/// The set is bounded: once `capacity` keys are held, the oldest key is
/// evicted to make room, so a long-running listener cannot grow without
/// limit. An evicted key can re-admit its record, which is acceptable for
/// this feed (repeats cluster in time).
pub struct DedupStore {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl DedupStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            seen: HashSet::with_capacity(capacity.min(1024)),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Record a key; returns true if it was not already present.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        if self.seen.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.to_string());
        self.order.push_back(key.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut store = DedupStore::new(10);
        assert!(store.insert("XYZ999-7700"));
        assert!(!store.insert("XYZ999-7700"));
        assert!(store.insert("XYZ999-7600"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_eviction_is_oldest_first() {
        let mut store = DedupStore::new(2);
        assert!(store.insert("a"));
        assert!(store.insert("b"));
        assert!(store.insert("c")); // evicts "a"
        assert_eq!(store.len(), 2);
        assert!(store.insert("a")); // readmitted after eviction
        assert!(!store.insert("c"));
    }
}
