//! Memory Cache Module
//!
//! Bounded key/value store that delegates eviction decisions to a pluggable
//! policy. The store owns the values; the policy owns only key-order
//! metadata. The two key sets are kept in lock-step: every store mutation
//! pairs with the matching policy call inside the same method, so no caller
//! can observe them diverged.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::cache::{CacheStats, EvictionPolicy};

// == Memory Cache ==
/// In-memory store bounded by entry count.
///
/// Callers receive clones of stored values, never handles into the store.
/// All methods take `&mut self`; shared use goes through a serialization
/// boundary such as `Arc<RwLock<MemoryCache>>` (reads update recency, so
/// they need the write lock too).
#[derive(Debug)]
pub struct MemoryCache<K, V, P> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// Eviction policy tracking key recency/usage
    policy: P,
    /// Performance counters
    stats: CacheStats,
    /// Maximum number of entries; 0 means nothing is kept
    max_entries: usize,
}

impl<K, V, P> MemoryCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `max_entries` values.
    pub fn new(max_entries: usize, policy: P) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Get ==
    /// Returns a clone of the value for `key`, marking the key as used.
    ///
    /// A miss is a normal outcome, not an error, and has no side effect
    /// beyond the miss counter.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                self.policy.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores `value` under `key`, overwriting any previous value, then
    /// evicts until the cache fits its capacity again.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key.clone(), value);
        self.policy.touch(&key);
        self.purge();
        debug_assert_eq!(self.entries.len(), self.policy.len());
    }

    // == Remove ==
    /// Removes the value for `key` if present.
    ///
    /// The policy is always told to forget the key; both calls are
    /// idempotent, so removing an absent key is a no-op.
    pub fn remove(&mut self, key: &K) {
        self.entries.remove(key);
        self.policy.remove(key);
        debug_assert_eq!(self.entries.len(), self.policy.len());
    }

    // == Clear ==
    /// Empties the store and the policy.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.policy.clear();
        debug_assert_eq!(self.entries.len(), self.policy.len());
    }

    // == Purge ==
    /// Evicts victims until the store fits `max_entries`.
    ///
    /// Terminates because every eviction strictly decreases the size and
    /// the policy yields a victim whenever it tracks any key; the lock-step
    /// invariant guarantees the victim is present in the store.
    fn purge(&mut self) {
        while self.entries.len() > self.max_entries {
            let Some(victim) = self.policy.victim() else {
                break;
            };
            self.entries.remove(&victim);
            self.policy.remove(&victim);
            self.stats.record_eviction();
            debug!(evictions = self.stats.evictions, "evicted cache entry");
        }
    }

    // == Accessors ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured maximum entry count.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.entries.len());
        stats
    }
}
