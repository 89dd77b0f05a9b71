//! Cache Store Module
//!
//! Main cache engine: a HashMap behind a single reader/writer lock, filled
//! lazily by the owner's loader and expired by the owner's policy.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, TimeZone};
use tracing::{debug, info, warn};

use crate::cache::builder::{Expiration, Loader};
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheBuilder, CacheEntry, CacheStats, Clock};
use crate::error::{CacheError, Result};

// == Expiring Cache ==
/// Thread-safe cache that loads missing or stale values on demand.
///
/// Build one with [`ExpiringCache::builder`]. Share it between threads with
/// an `Arc`; every operation takes `&self`.
///
/// The loader runs outside the lock, so two threads missing on the same key
/// may both load it. The last write wins.
pub struct ExpiringCache<K, V> {
    /// Key-value storage
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Produces a value on a miss
    loader: Loader<K, V>,
    /// Produces the deadline for a freshly loaded value
    expiration: Expiration<K>,
    /// Time source for expiration checks
    clock: Arc<dyn Clock>,
    /// Entry count above which the store is wiped
    max_entries: usize,
    /// Activity counters
    stats: StatsRecorder,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Starts building a cache.
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(
        loader: Loader<K, V>,
        expiration: Expiration<K>,
        clock: Arc<dyn Clock>,
        max_entries: usize,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            loader,
            expiration,
            clock,
            max_entries,
            stats: StatsRecorder::default(),
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, loading it if absent or expired.
    ///
    /// On a miss the loader and the expiration policy run with no lock held,
    /// then the result is stored through [`set`](Self::set). A loader error
    /// is returned as [`CacheError::LoaderFailure`] and leaves the store
    /// untouched.
    pub fn get(&self, key: &K) -> Result<V> {
        if let Some(value) = self.lookup(key) {
            self.stats.record_hit();
            debug!("Cache hit");
            return Ok(value);
        }
        self.stats.record_miss();

        let value = match (self.loader)(key) {
            Ok(value) => value,
            Err(err) => {
                self.stats.record_load_failure();
                warn!(error = %err, "Loader failed, nothing cached");
                return Err(CacheError::LoaderFailure(err));
            }
        };
        self.stats.record_load();

        let expires_at = self.expiration.deadline(key, self.clock.now());
        debug!(%expires_at, "Loaded value on cache miss");
        self.set(key.clone(), value.clone(), expires_at);

        Ok(value)
    }

    // == Set ==
    /// Stores `value` under `key` with a fresh, non-revoked marker.
    ///
    /// Any previous entry for `key` is replaced. If storing a new key pushes
    /// the count past `max_entries`, every other entry is dropped.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `expires_at` - Deadline in any time zone; stored as UTC
    pub fn set<Tz: TimeZone>(&self, key: K, value: V, expires_at: DateTime<Tz>) {
        let entry = CacheEntry::new(value, expires_at);
        let mut entries = self.write_entries();

        // Inserting a new key into a full store is the only way to exceed
        // the limit; clearing first leaves exactly the new entry.
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let evicted = entries.len();
            entries.clear();
            self.stats.record_capacity_wipe();
            warn!(
                evicted,
                max_entries = self.max_entries,
                "Cache capacity exceeded, wiped all entries"
            );
        }

        entries.insert(key, entry);
    }

    // == Revoke ==
    /// Marks the entry for `key` as expired so the next `get` reloads it.
    ///
    /// Unknown keys are ignored. Returns whether an entry was present.
    pub fn revoke(&self, key: &K) -> bool {
        let mut entries = self.write_entries();
        match entries.get_mut(key) {
            Some(entry) => {
                if !entry.marker.is_revoked() {
                    entry.marker.revoke();
                    self.stats.record_revocation();
                    debug!("Revoked cache entry");
                }
                true
            }
            None => false,
        }
    }

    // == Revoke All ==
    /// Drops every entry.
    pub fn revoke_all(&self) {
        let mut entries = self.write_entries();
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Revoked all cache entries");
    }

    // == Peek ==
    /// Returns the cached value only if it is present and fresh.
    ///
    /// Never loads, never mutates, and is not counted in the statistics.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.lookup(key)
    }

    // == Time To Live ==
    /// Returns how long the entry for `key` stays fresh.
    ///
    /// # Returns
    /// - `None` if there is no entry, or it is expired or revoked
    /// - `Some(remaining)` otherwise
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        let entries = self.read_entries();
        let now = self.clock.now();
        entries
            .get(key)
            .and_then(|entry| entry.marker.remaining_at(now))
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    fn lookup(&self, key: &K) -> Option<V> {
        let entries = self.read_entries();
        let now = self.clock.now();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    // Every locked region leaves the map consistent, so a poisoned lock is
    // still safe to use.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ExpiringCache")
            .field("len", &len)
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}
