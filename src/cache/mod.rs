//! Cache Module
//!
//! Provides a lazily loaded in-memory cache with timestamp expiration,
//! manual revocation, and a wipe-all capacity guard.

mod builder;
mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use builder::CacheBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub(crate) use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ExpiringCache;

// == Public Constants ==
/// Default maximum entry count; large enough that the capacity guard never fires
pub const UNBOUNDED_ENTRIES: usize = usize::MAX;
