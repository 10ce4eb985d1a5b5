//! Riot API Cache
//!
//! A pluggable, TTL-aware cache for memoizing Riot API responses, featuring:
//! - **In-Memory Backend**: process-local `DashMap` with lazy expiry
//! - **Redis Backend**: shared cache with namespaced keys and native `SETEX` TTLs
//! - **MongoDB Backend**: persistent cache with index-driven expiry
//! - **One Contract**: `get` / `set` / `flush` behave identically everywhere
//! - **Env-Driven Selection**: pick the backend per deployment, not per call site
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use riot_api_cache::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Backend comes from the config; defaults to in-memory
//!     let cache = Cache::connect(&CacheConfig::default()).await?;
//!
//!     // Store a fetched response for one minute
//!     let summoner = serde_json::json!({"puuid": "abc123", "summonerLevel": 42});
//!     cache
//!         .set("summoner-na1-hideonbush", summoner, Duration::from_millis(60_000))
//!         .await?;
//!
//!     // Later lookups skip the upstream call
//!     if let Some(hit) = cache.get("summoner-na1-hideonbush").await? {
//!         tracing::info!("cache hit: {hit}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Uniform Semantics**: a miss is `Ok(None)`, never an error
//! - **TTL Zero Means Forever**: a zero duration stores the entry without expiry
//! - **Swappable Backends**: implement [`CacheStore`] to plug in your own
//! - **Zero-Config**: sensible defaults, works out of the box
//!
//! # Architecture
//!
//! ```text
//! Caller → Cache (facade) → InMemoryCache   RedisCache   MongoCache
//!                           lazy expiry     SETEX TTL    TTL index
//! ```

use std::time::Duration;
use tracing::{info, warn};

pub mod backends;
pub mod config;
pub mod error;
pub mod traits;

// Re-export backend types
pub use backends::{InMemoryCache, MongoCache, RedisCache};

pub use config::{BackendKind, CacheConfig};
pub use error::{CacheError, CacheResult};
pub use traits::{CacheStats, CacheStore, SetStatus};

// Re-export async_trait for user convenience
pub use async_trait::async_trait;

/// Main entry point: one cache handle backed by the configured engine.
///
/// The backend is chosen once at construction; every operation afterwards
/// dispatches straight to it. All backends honor the same contract, so
/// swapping engines is a config change, not a code change.
///
/// # Example
///
/// ```rust,no_run
/// use riot_api_cache::Cache;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     // CACHE_BACKEND / REDIS_URL / MONGODB_URI control the selection
///     let cache = Cache::from_env().await?;
///     tracing::info!("using {} cache", cache.name());
///     Ok(())
/// }
/// ```
pub enum Cache {
    /// Process-local backend, no external service.
    Memory(InMemoryCache),
    /// Shared Redis backend.
    Redis(RedisCache),
    /// Persistent MongoDB backend.
    Mongo(MongoCache),
}

impl Cache {
    /// Create the cache backend named by `config`.
    ///
    /// Redis connections are verified here; the MongoDB bootstrap runs in
    /// the background and operations await it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error when the Redis backend is selected and the initial
    /// connection fails.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        info!(backend = config.backend.as_str(), "Initializing cache");

        let cache = match config.backend {
            BackendKind::Memory => Self::Memory(InMemoryCache::new()),
            BackendKind::Redis => Self::Redis(RedisCache::connect(&config.redis_url).await?),
            BackendKind::MongoDb => Self::Mongo(MongoCache::connect(&config.mongodb_uri)),
        };

        Ok(cache)
    }

    /// Create the cache from `CACHE_BACKEND`, `REDIS_URL`, and `MONGODB_URI`.
    ///
    /// # Errors
    ///
    /// Returns an error when the selected backend fails to connect.
    pub async fn from_env() -> CacheResult<Self> {
        Self::connect(&CacheConfig::from_env()).await
    }

    /// Get the cached value for `key`, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend lookup fails; a miss is `Ok(None)`.
    pub async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
            Self::Mongo(cache) => cache.get(key).await,
        }
    }

    /// Store `value` under `key` for `ttl`; zero means no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend write fails. A write the backend
    /// reports as not applied is `Ok(SetStatus::Unacknowledged)`.
    pub async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Redis(cache) => cache.set(key, value, ttl).await,
            Self::Mongo(cache) => cache.set(key, value, ttl).await,
        }
    }

    /// Drop every cached entry.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend flush fails.
    pub async fn flush(&self) -> CacheResult<()> {
        match self {
            Self::Memory(cache) => cache.flush().await,
            Self::Redis(cache) => cache.flush().await,
            Self::Mongo(cache) => cache.flush().await,
        }
    }

    /// Probe the backend end to end.
    pub async fn health_check(&self) -> bool {
        let healthy = match self {
            Self::Memory(cache) => cache.health_check().await,
            Self::Redis(cache) => cache.health_check().await,
            Self::Mongo(cache) => cache.health_check().await,
        };

        if healthy {
            info!(backend = self.name(), "Cache health check passed");
        } else {
            warn!(backend = self.name(), "Cache health check failed");
        }
        healthy
    }

    /// Snapshot of the backend's operation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        match self {
            Self::Memory(cache) => cache.stats(),
            Self::Redis(cache) => cache.stats(),
            Self::Mongo(cache) => cache.stats(),
        }
    }

    /// Human-readable backend name, mainly for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.as_store().name()
    }

    /// Borrow the active backend as a [`CacheStore`] trait object.
    #[must_use]
    pub fn as_store(&self) -> &dyn CacheStore {
        match self {
            Self::Memory(cache) => cache,
            Self::Redis(cache) => cache,
            Self::Mongo(cache) => cache,
        }
    }
}
