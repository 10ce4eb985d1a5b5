//! Cache error taxonomy
//!
//! Absence is not an error: a missing or expired key is `Ok(None)` from
//! `get`, and a write the backend processed but did not confirm is
//! `Ok(SetStatus::Unacknowledged)` from `set`. `CacheError` is reserved for
//! failures the caller may want to retry or surface: transport problems,
//! payload codec problems, and a document-store backend that never became
//! usable.

use thiserror::Error;

/// Convenience alias for cache operation results.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failures surfaced by cache operations.
///
/// Callers relying purely on `Ok(None)` vs `Ok(Some(..))` cannot tell a miss
/// from a dead backend; connectivity failures are therefore raised as errors
/// instead of being folded into "absent". No retry happens at this layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis connection or command failure.
    #[error("redis command failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// MongoDB driver or server failure.
    #[error("mongodb operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Cache payload could not be encoded to or decoded from JSON.
    #[error("cache payload codec failed: {0}")]
    Codec(#[from] serde_json::Error),

    /// The document-store bootstrap failed; every operation on that backend
    /// instance reports the recorded failure instead of proceeding against a
    /// half-initialized store.
    #[error("document store bootstrap failed: {message}")]
    Bootstrap { message: String },

    /// Bootstrap reported success but never published a collection handle.
    /// This is an internal invariant violation, not a retryable condition.
    #[error("document collection handle missing after bootstrap completed")]
    Uninitialized,
}

impl CacheError {
    /// Build a [`CacheError::Bootstrap`] from the recorded failure message.
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: message.into(),
        }
    }
}
