//! Expiring Cache - A thread-safe, lazily loaded key-value cache
//!
//! Values are produced on demand by an owner-supplied loader, expire at a
//! timestamp chosen by an owner-supplied policy, and can be revoked manually.
//! Exceeding the configured entry count wipes the whole store.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    CacheBuilder, CacheStats, Clock, ExpiringCache, ManualClock, SystemClock, UNBOUNDED_ENTRIES,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
