//! Cache contract
//!
//! This module defines the uniform contract every storage backend satisfies,
//! so callers can memoize upstream API responses without knowing whether the
//! configured backend is process memory, Redis, or MongoDB.
//!
//! # Architecture
//!
//! - `CacheStore`: the polymorphic interface (`get`, `set`, `flush`)
//! - `SetStatus`: write acknowledgement outcome, distinct from transport errors
//! - `CacheStats`: per-backend counter snapshot for diagnostics
//!
//! # Example: Custom Backend
//!
//! ```rust,ignore
//! use riot_api_cache::{async_trait, CacheResult, CacheStore, SetStatus};
//! use std::time::Duration;
//!
//! struct MyStore {
//!     // Your implementation
//! }
//!
//! #[async_trait]
//! impl CacheStore for MyStore {
//!     async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
//!         // Your implementation
//!     }
//!
//!     async fn set(
//!         &self,
//!         key: &str,
//!         value: serde_json::Value,
//!         ttl: Duration,
//!     ) -> CacheResult<SetStatus> {
//!         // Your implementation
//!     }
//!
//!     async fn flush(&self) -> CacheResult<()> {
//!         // Your implementation
//!     }
//! }
//! ```

use crate::error::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a `set` call that reached the backend.
///
/// A write the backend processed but could not durably confirm is *not* a
/// transport error: backends that can report "not applied" (MongoDB write
/// results) return [`SetStatus::Unacknowledged`] so callers can decide
/// whether to retry, while `Err` stays reserved for failures of the call
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    /// The backend confirmed the write.
    Acknowledged,
    /// The backend processed the call but did not confirm the write was
    /// applied.
    Unacknowledged,
}

impl SetStatus {
    /// `true` when the backend confirmed the write.
    #[must_use]
    pub fn is_acknowledged(self) -> bool {
        matches!(self, Self::Acknowledged)
    }
}

/// Per-backend operation counters.
///
/// `expired` counts entries dropped by read-time expiry checks; backends with
/// native expiry (Redis, MongoDB) never increment it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub expired: u64,
}

/// Uniform contract satisfied by every cache backend.
///
/// # Semantics
///
/// - `get` never errors for absence: a missing or expired key is `Ok(None)`.
/// - `set` is an upsert; writing an existing key replaces its value and
///   expiry together. A `ttl` of [`Duration::ZERO`] means the entry never
///   expires.
/// - `flush` removes every entry the backend is responsible for, regardless
///   of expiry state, before returning.
///
/// The contract guarantees only that expired entries are invisible to `get`,
/// never that a backend deletes them by any given deadline.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; all operations are non-blocking
/// hand-offs to the backend and hold no lock across a suspension point.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the stored value for `key`, or `None` when the key is missing or
    /// expired.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or payload-decoding failure, never for
    /// a plain miss.
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>>;

    /// Store `value` under `key`, overwriting any existing entry.
    ///
    /// `ttl` is measured from call time; [`Duration::ZERO`] stores the entry
    /// with no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or payload-encoding failure. A write the
    /// backend processed but could not confirm is
    /// `Ok(`[`SetStatus::Unacknowledged`]`)`, not an error.
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus>;

    /// Remove every entry, expired or not.
    ///
    /// Maintenance/test surface, not a hot-path operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend could not complete the clear.
    async fn flush(&self) -> CacheResult<()>;

    /// Diagnostic label for this backend ("Memory", "Redis", "MongoDB").
    fn name(&self) -> &'static str {
        "unknown"
    }
}
