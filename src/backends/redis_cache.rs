//! Remote Key-Value Backend
//!
//! Redis-backed cache that delegates storage and expiry to the server's
//! native key TTL mechanism. Payloads travel as JSON text; every key is
//! namespaced with a fixed prefix so the cache can share a Redis instance
//! with unrelated data.

use crate::error::CacheResult;
use crate::traits::{CacheStats, SetStatus};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Prefix applied to every key before it reaches the wire.
const KEY_PREFIX: &str = "fm-riot-api-";

/// Redis cache backend with `ConnectionManager` for automatic reconnection.
///
/// - Keys are sent as `fm-riot-api-{key}`
/// - Values are stored as JSON text
/// - Expiry is the server's own TTL handling; nothing is checked at read time
pub struct RedisCache {
    /// Redis connection manager - handles reconnection automatically
    conn_manager: ConnectionManager,
    /// Hit counter
    hits: Arc<AtomicU64>,
    /// Miss counter
    misses: Arc<AtomicU64>,
    /// Set counter
    sets: Arc<AtomicU64>,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with a `PING`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created or the connection
    /// handshake fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!(redis_url = %redis_url, "Initializing Redis cache backend");

        let client = Client::open(redis_url)?;

        // ConnectionManager re-establishes dropped connections on its own
        let conn_manager = ConnectionManager::new(client).await?;

        let mut conn = conn_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!(redis_url = %redis_url, "Redis cache backend connected");

        Ok(Self {
            conn_manager,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            sets: Arc::new(AtomicU64::new(0)),
        })
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    /// Map a millisecond TTL onto the wire's whole-second expiry.
    ///
    /// `None` means "store without expiry": a zero TTL carries never-expires
    /// intent, and truncating it to `SETEX .. 0` would instead be rejected by
    /// the server. Non-zero TTLs below one second round up to one second for
    /// the same reason.
    fn ttl_seconds(ttl: Duration) -> Option<u64> {
        if ttl.is_zero() {
            None
        } else {
            Some(ttl.as_secs().max(1))
        }
    }

    /// Get the value stored under the namespaced `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the command fails or the stored payload is not
    /// valid JSON; a missing key is `Ok(None)`.
    pub async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        let mut conn = self.conn_manager.clone();

        let payload: Option<String> = conn.get(Self::namespaced(key)).await?;
        match payload {
            Some(json) => {
                let value = serde_json::from_str(&json)?;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(value))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Store `value` as JSON text under the namespaced `key`.
    ///
    /// A non-zero `ttl` becomes a `SETEX` in whole seconds; zero becomes a
    /// plain `SET` with no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the command fails; a reply the
    /// server accepts is an acknowledged write.
    pub async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        let payload = serde_json::to_string(&value)?;
        let namespaced = Self::namespaced(key);
        let mut conn = self.conn_manager.clone();

        match Self::ttl_seconds(ttl) {
            Some(secs) => {
                let _: () = conn.set_ex(&namespaced, payload, secs).await?;
                debug!(key = %namespaced, ttl_secs = %secs, "[Redis] Cached key with TTL");
            }
            None => {
                let _: () = conn.set(&namespaced, payload).await?;
                debug!(key = %namespaced, "[Redis] Cached key without expiry");
            }
        }

        self.sets.fetch_add(1, Ordering::Relaxed);
        Ok(SetStatus::Acknowledged)
    }

    /// Clear the **entire logical database**, not just the namespaced keys.
    ///
    /// This is deliberately as broad as `FLUSHDB`: anything else stored in
    /// the same database index is removed too. Point the cache at a dedicated
    /// database index if that breadth is unacceptable.
    ///
    /// # Errors
    ///
    /// Returns an error when the command fails.
    pub async fn flush(&self) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        debug!("[Redis] Flushed database");
        Ok(())
    }

    /// Probe the backend with a short-lived write/read roundtrip.
    pub async fn health_check(&self) -> bool {
        let test_key = "health_check_redis";
        let test_value = serde_json::json!({"probe": true});

        match self
            .set(test_key, test_value.clone(), Duration::from_secs(10))
            .await
        {
            Ok(_) => match self.get(test_key).await {
                Ok(Some(retrieved)) => {
                    let mut conn = self.conn_manager.clone();
                    let _: Result<(), _> = conn.del(Self::namespaced(test_key)).await;
                    retrieved == test_value
                }
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            expired: 0,
        }
    }
}

// ===== Trait Implementations =====

use crate::traits::CacheStore;
use async_trait::async_trait;

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        RedisCache::get(self, key).await
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        RedisCache::set(self, key, value, ttl).await
    }

    async fn flush(&self) -> CacheResult<()> {
        RedisCache::flush(self).await
    }

    fn name(&self) -> &'static str {
        "Redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(RedisCache::namespaced("k"), "fm-riot-api-k");
        assert_eq!(
            RedisCache::namespaced("summoner/euw/abc"),
            "fm-riot-api-summoner/euw/abc"
        );
    }

    #[test]
    fn ttl_resolution() {
        // Zero carries never-expires intent
        assert_eq!(RedisCache::ttl_seconds(Duration::ZERO), None);
        // Sub-second TTLs round up instead of truncating to an illegal zero
        assert_eq!(RedisCache::ttl_seconds(Duration::from_millis(250)), Some(1));
        // Whole seconds truncate, matching the wire protocol
        assert_eq!(
            RedisCache::ttl_seconds(Duration::from_millis(5000)),
            Some(5)
        );
        assert_eq!(
            RedisCache::ttl_seconds(Duration::from_millis(5999)),
            Some(5)
        );
    }
}
