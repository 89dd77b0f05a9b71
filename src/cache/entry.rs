//! Cache Entry Module
//!
//! Defines individual cache entries and their expiration markers.

use chrono::{DateTime, Duration, TimeZone, Utc};

// == Expiration Marker ==
/// Decides whether an entry is stale: an absolute UTC deadline plus a
/// manual revocation flag that overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpirationMarker {
    expires_at: DateTime<Utc>,
    revoked: bool,
}

impl ExpirationMarker {
    // == Constructor ==
    /// Creates a marker expiring at `expires_at`, normalized to UTC.
    pub fn new<Tz: TimeZone>(expires_at: DateTime<Tz>) -> Self {
        Self {
            expires_at: expires_at.with_timezone(&Utc),
            revoked: false,
        }
    }

    /// Marks the entry as expired regardless of its deadline.
    ///
    /// There is no way back: only replacing the entry clears the flag.
    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    // == Is Expired ==
    /// Checks whether the marker is expired at `now`.
    ///
    /// Boundary condition: reaching the deadline exactly counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked || self.expires_at <= now
    }

    /// Returns how long the entry stays fresh, or None once it has expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.expires_at - now)
        }
    }
}

// == Cache Entry ==
/// A cached value with its expiration marker.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// Expiration state
    pub marker: ExpirationMarker,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh, non-revoked entry.
    ///
    /// # Arguments
    /// * `value` - The value to cache
    /// * `expires_at` - Deadline in any time zone
    pub fn new<Tz: TimeZone>(value: V, expires_at: DateTime<Tz>) -> Self {
        Self {
            value,
            marker: ExpirationMarker::new(expires_at),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.marker.is_expired_at(now)
    }
}
