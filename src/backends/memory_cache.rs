//! In-Memory Backend
//!
//! Process-local cache over a concurrent map with lazily checked expiry.
//! No external I/O; operations complete without suspending.

use crate::error::CacheResult;
use crate::traits::{CacheStats, SetStatus};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache entry with its absolute expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    /// `None` means the entry never expires.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: serde_json::Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: (ttl > Duration::ZERO).then(|| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() > expires_at)
    }
}

/// In-memory cache backend.
///
/// Each instance owns its own map; two instances never share entries.
/// Expired entries are removed only when they are next read (lazy eviction)
/// or when `flush` runs. There is no background sweep, so an expired entry
/// occupies memory until one of those happens.
pub struct InMemoryCache {
    /// Key → entry mapping, owned exclusively by this instance.
    map: DashMap<String, CacheEntry>,
    /// Hit counter
    hits: Arc<AtomicU64>,
    /// Miss counter
    misses: Arc<AtomicU64>,
    /// Set counter
    sets: Arc<AtomicU64>,
    /// Entries dropped by read-time expiry checks
    expired: Arc<AtomicU64>,
}

impl InMemoryCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            sets: Arc::new(AtomicU64::new(0)),
            expired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the stored value for `key`.
    ///
    /// An expired entry is deleted here as a side effect and reported as a
    /// miss; this read path is the backend's only eviction mechanism.
    pub async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        if let Some(entry) = self.map.get(key) {
            if entry.is_expired() {
                drop(entry); // Release the shard read guard before removing
                self.map.remove(key);
                self.expired.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "[Memory] Evicted expired entry on read");
                Ok(None)
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.value.clone()))
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }
    }

    /// Insert or overwrite the entry for `key`.
    ///
    /// A `ttl` of [`Duration::ZERO`] stores the entry without an expiry
    /// instant. This backend cannot fail; the result is always
    /// [`SetStatus::Acknowledged`].
    pub async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        self.map.insert(key.to_string(), CacheEntry::new(value, ttl));
        self.sets.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, ttl_ms = %ttl.as_millis(), "[Memory] Cached key");
        Ok(SetStatus::Acknowledged)
    }

    /// Remove every entry, expired or not.
    pub async fn flush(&self) -> CacheResult<()> {
        self.map.clear();
        debug!("[Memory] Flushed all entries");
        Ok(())
    }

    /// Probe the map with a short-lived entry.
    pub async fn health_check(&self) -> bool {
        let test_key = "health_check_memory";
        let test_value = serde_json::json!({"probe": true});

        let stored = self
            .set(test_key, test_value.clone(), Duration::from_secs(60))
            .await
            .is_ok();
        let retrieved = matches!(self.get(test_key).await, Ok(Some(value)) if value == test_value);
        self.map.remove(test_key);
        stored && retrieved
    }

    /// Number of entries currently held, including expired ones not yet
    /// evicted by a read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Trait Implementations =====

use crate::traits::CacheStore;
use async_trait::async_trait;

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        InMemoryCache::get(self, key).await
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        InMemoryCache::set(self, key, value, ttl).await
    }

    async fn flush(&self) -> CacheResult<()> {
        InMemoryCache::flush(self).await
    }

    fn name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_without_ttl_never_expires() {
        let entry = CacheEntry::new(serde_json::json!(1), Duration::ZERO);
        assert_eq!(entry.expires_at, None);
        assert!(!entry.is_expired());
    }

    #[test]
    fn entry_expiry_follows_instant() {
        let mut entry = CacheEntry::new(serde_json::json!(1), Duration::from_secs(60));
        assert!(!entry.is_expired());

        entry.expires_at = Some(Instant::now() - Duration::from_millis(1));
        assert!(entry.is_expired());
    }
}
