//! Cache Builder Module
//!
//! Collects the loader, expiration policy, clock and capacity for an
//! [`ExpiringCache`] and validates them before construction.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::{Clock, ExpiringCache, SystemClock, UNBOUNDED_ENTRIES};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Produces a value for a key on a cache miss.
pub(crate) type Loader<K, V> = Box<dyn Fn(&K) -> anyhow::Result<V> + Send + Sync>;

/// Produces the deadline for a freshly loaded value.
pub(crate) type ExpirationPolicy<K> = Box<dyn Fn(&K) -> DateTime<Utc> + Send + Sync>;

/// How a freshly loaded value gets its deadline.
pub(crate) enum Expiration<K> {
    /// Owner-supplied, possibly per key
    Policy(ExpirationPolicy<K>),
    /// Same lifetime for every key, counted from the load
    Ttl(chrono::Duration),
}

impl<K> Expiration<K> {
    pub(crate) fn deadline(&self, key: &K, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Expiration::Policy(policy) => policy(key),
            Expiration::Ttl(ttl) => now
                .checked_add_signed(*ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

// == Cache Builder ==
/// Builder for [`ExpiringCache`].
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use expiring_cache::ExpiringCache;
///
/// let cache = ExpiringCache::builder()
///     .loader(|id: &u64| Ok(format!("site-{id}")))
///     .ttl(Duration::from_secs(300))
///     .max_entries(10_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.get(&7).unwrap(), "site-7");
/// ```
pub struct CacheBuilder<K, V> {
    loader: Option<Loader<K, V>>,
    policy: Option<ExpirationPolicy<K>>,
    ttl: Option<Duration>,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            loader: None,
            policy: None,
            ttl: None,
            max_entries: UNBOUNDED_ENTRIES,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the function that loads a value on a miss.
    ///
    /// It may be called concurrently, including more than once for the
    /// same key.
    pub fn loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&K) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Sets the function that picks the deadline of a freshly loaded value.
    pub fn expiration<F>(mut self, policy: F) -> Self
    where
        F: Fn(&K) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.policy = Some(Box::new(policy));
        self.ttl = None;
        self
    }

    /// Loaded values expire `ttl` after they are loaded, for every key.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self.policy = None;
        self
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Applies a [`CacheConfig`]: its entry limit, and its default TTL
    /// unless an expiration policy was already chosen.
    pub fn config(mut self, config: &CacheConfig) -> Self {
        self.max_entries = config.max_entries;
        if self.policy.is_none() && self.ttl.is_none() {
            self.ttl = Some(config.default_ttl());
        }
        self
    }

    /// Replaces the wall clock used for expiration checks.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // == Build ==
    /// Validates the collected settings and creates the cache.
    pub fn build(self) -> Result<ExpiringCache<K, V>> {
        let loader = self.loader.ok_or_else(|| {
            CacheError::InvalidConfiguration("a loader is required".to_string())
        })?;

        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfiguration(
                "max_entries must be at least 1".to_string(),
            ));
        }

        let expiration = match (self.policy, self.ttl) {
            (Some(policy), _) => Expiration::Policy(policy),
            (None, Some(ttl)) => Expiration::Ttl(checked_ttl(ttl)?),
            (None, None) => {
                return Err(CacheError::InvalidConfiguration(
                    "an expiration policy or ttl is required".to_string(),
                ))
            }
        };

        Ok(ExpiringCache::from_parts(
            loader,
            expiration,
            self.clock,
            self.max_entries,
        ))
    }
}

impl<K, V> Default for CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

fn checked_ttl(ttl: Duration) -> Result<chrono::Duration> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidConfiguration(
            "ttl must be greater than zero".to_string(),
        ));
    }
    chrono::Duration::from_std(ttl).map_err(|_| {
        CacheError::InvalidConfiguration(format!("ttl of {}s is out of range", ttl.as_secs()))
    })
}
