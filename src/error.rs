//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The loader failed while servicing a miss. The loader's error is kept
    /// as-is and can be recovered with `downcast_ref`.
    #[error("Loader failed: {0}")]
    LoaderFailure(#[from] anyhow::Error),

    /// The cache was configured with values it cannot honor
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CacheError {
    /// Returns the loader's original error, if this is a loader failure.
    pub fn loader_error(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::LoaderFailure(err) => Some(err),
            CacheError::InvalidConfiguration(_) => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
