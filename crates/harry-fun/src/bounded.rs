//! Insertion-ordered map with a hard size bound.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Live entries allowed before eviction kicks in.
pub const BOUNDED_MAP_LIMIT: usize = 100;

/// Entries dropped, oldest first, once the limit is exceeded.
pub const BOUNDED_MAP_EVICT: usize = 50;

/// Map that drops its oldest entries in a batch when it grows past a limit.
///
/// This is a growth guard, not a cache: eviction follows insertion order
/// and ignores reads.
#[derive(Debug, Clone)]
pub struct BoundedMap<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    limit: usize,
    evict: usize,
}

impl<K, V> Default for BoundedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(BOUNDED_MAP_LIMIT, BOUNDED_MAP_EVICT)
    }
}

impl<K, V> BoundedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a map holding at most `limit` entries, dropping the `evict`
    /// oldest when an insert pushes it over.
    pub fn new(limit: usize, evict: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            limit,
            evict: evict.clamp(1, limit.max(1)),
        }
    }

    /// Inserts or updates an entry; an update keeps the original position.
    /// Returns how many entries were evicted.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        if self.entries.len() <= self.limit {
            return 0;
        }
        let mut evicted = 0;
        while evicted < self.evict {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                evicted += 1;
            }
        }
        evicted
    }

    /// Looks up an entry.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_eviction_drops_oldest_fifty() {
        let mut map = BoundedMap::default();
        for i in 0..100u64 {
            assert_eq!(map.insert(i, ()), 0);
        }
        assert_eq!(map.len(), 100);

        assert_eq!(map.insert(100, ()), 50);
        assert_eq!(map.len(), 51);
        assert!(!map.contains_key(&0));
        assert!(!map.contains_key(&49));
        assert!(map.contains_key(&50));
        assert!(map.contains_key(&100));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut map = BoundedMap::new(3, 1);
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 10);
        map.insert("c", 3);
        map.insert("d", 4);
        assert!(!map.contains_key(&"a"));
        assert_eq!(map.get(&"b"), Some(&2));
    }

    #[test]
    fn test_remove() {
        let mut map = BoundedMap::default();
        map.insert(1u64, "x");
        assert_eq!(map.remove(&1), Some("x"));
        assert!(map.is_empty());
        assert_eq!(map.remove(&1), None);
    }

    proptest! {
        #[test]
        fn test_never_exceeds_limit(keys in proptest::collection::vec(0u64..500, 0..600)) {
            let mut map = BoundedMap::default();
            for key in keys {
                map.insert(key, key);
                prop_assert!(map.len() <= BOUNDED_MAP_LIMIT);
            }
        }
    }
}
