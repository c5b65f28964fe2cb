//! Unbounded, thread-safe memoization cache
//!
//! Each key owns a slot (`OnceCell`) that is filled at most once. The slot map
//! is only locked to find or insert a slot; the computation itself runs
//! outside the map lock, inside the slot's own initialization guard. As a
//! result, callers racing on the same key wait for a single computation while
//! callers on different keys run in parallel.
//!
//! Entries are never evicted or overwritten. A computation that fails stores
//! nothing: its slot is dropped from the map unless another caller is already
//! waiting on it, and the next caller for that key computes again.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;
use serde_derive::Serialize;

type Slot<V> = Arc<OnceCell<V>>;

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored values
    pub entries: u64,
    /// Calls answered from the cache, including callers that waited on a
    /// concurrent computation of the same key
    pub hits: u64,
    /// Calls that ran the computation and stored its value
    pub misses: u64,
    /// Computations that failed and stored nothing
    pub failures: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `0.0` when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses + self.failures;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    entries: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

/// Key-to-value cache with at-most-once computation per key
pub struct MemoCache<K, V> {
    slots: RwLock<HashMap<K, Slot<V>>>,
    counters: Counters,
    label: String,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::labelled(capacity, "anonymous")
    }

    /// Creates an empty cache whose log lines carry `label`
    pub(crate) fn labelled(capacity: usize, label: &str) -> Self {
        log::debug!("memo[{}]: cache created (capacity {})", label, capacity);
        Self {
            slots: RwLock::new(HashMap::with_capacity(capacity)),
            counters: Counters::default(),
            label: label.to_string(),
        }
    }

    /// Returns the cached value for `key`, computing and storing it first if absent.
    ///
    /// `compute` receives the key by value and runs at most once per key over
    /// the lifetime of the cache, even when several threads ask for the same key
    /// concurrently; the losers of that race block until the value is ready.
    ///
    /// # Examples
    ///
    /// ```
    /// use memofn::functional::memo_cache::MemoCache;
    ///
    /// let cache = MemoCache::new();
    /// assert_eq!(cache.get_or_insert_with(3, |n| n * 2), 6);
    /// assert_eq!(cache.get_or_insert_with(3, |_| unreachable!()), 6);
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce(K) -> V,
        V: Clone,
    {
        let slot = self.slot(&key);
        let mut computed = false;
        let value = slot.get_or_init(|| {
            computed = true;
            compute(key)
        });
        self.record(computed);
        value.clone()
    }

    /// Fallible form of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// An `Err` from `compute` is returned unchanged and nothing is stored,
    /// so a later call for the same key computes again.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Result<V, E>,
        V: Clone,
    {
        let slot = self.slot(&key);
        let mut attempted = None;
        match slot.get_or_try_init(|| {
            attempted = Some(key.clone());
            compute(key)
        }) {
            Ok(value) => {
                self.record(attempted.is_some());
                Ok(value.clone())
            }
            Err(err) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                log::debug!("memo[{}]: computation failed, nothing cached", self.label);
                if let Some(key) = attempted {
                    self.discard_empty(&key, slot);
                }
                Err(err)
            }
        }
    }

    /// Returns the stored value for `key` without computing anything
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.read_slots()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read_slots()
            .get(key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of stored values; keys whose computation failed are not counted
    pub fn len(&self) -> usize {
        self.read_slots()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, computed: bool) {
        if computed {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            self.counters.entries.fetch_add(1, Ordering::Relaxed);
            log::trace!("memo[{}]: miss, value stored", self.label);
        } else {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("memo[{}]: hit", self.label);
        }
    }

    /// Finds the slot for `key`, inserting an empty one if needed
    fn slot(&self, key: &K) -> Slot<V> {
        if let Some(slot) = self.read_slots().get(key) {
            return Arc::clone(slot);
        }

        let mut slots = self.write_slots();
        Arc::clone(
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Drops the slot of a failed key unless another caller still holds it.
    ///
    /// Slots are only cloned under the map lock, so with the write lock held a
    /// strong count of two (map + `slot`) means no one else can be waiting on
    /// it. A waiter that already holds the slot retries the computation in it,
    /// so the slot must stay.
    fn discard_empty(&self, key: &K, slot: Slot<V>) {
        let mut slots = self.write_slots();
        let unused = slots
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, &slot) && held.get().is_none());
        if unused && Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }
    }

    // No user code runs while the map lock is held, so a poisoned map is
    // still consistent and can be used as is.
    fn read_slots(&self) -> RwLockReadGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.read().unwrap_or_else(|poison| {
            log::warn!("memo[{}]: slot map lock was poisoned, recovering", self.label);
            PoisonError::into_inner(poison)
        })
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.write().unwrap_or_else(|poison| {
            log::warn!("memo[{}]: slot map lock was poisoned, recovering", self.label);
            PoisonError::into_inner(poison)
        })
    }
}

impl<K, V> MemoCache<K, V> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.counters.entries.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("label", &self.label)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
