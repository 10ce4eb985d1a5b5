//! Common utilities for integration tests
//!
//! This module provides shared test infrastructure including:
//! - Backend connection helpers
//! - Test data generators
//! - Readiness polling

use anyhow::Result;
use riot_api_cache::{BackendKind, Cache, CacheConfig};
use std::time::Duration;

/// Get Redis URL from environment or use default
pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Redis URL for flush tests.
///
/// Flushing clears the whole selected database, so these tests default to
/// database 15 instead of the shared default database.
pub fn redis_flush_url() -> String {
    std::env::var("REDIS_FLUSH_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}

/// Get MongoDB URI from environment or use default
pub fn mongodb_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string())
}

/// Create a test key with unique suffix to avoid conflicts between tests
pub fn test_key(name: &str) -> String {
    format!("test_{}_{}", name, rand::random::<u32>())
}

/// Initialize an in-memory cache
pub async fn setup_memory_cache() -> Result<Cache> {
    let config = CacheConfig {
        backend: BackendKind::Memory,
        ..CacheConfig::default()
    };
    Ok(Cache::connect(&config).await?)
}

/// Initialize a Redis-backed cache against a live instance
pub async fn setup_redis_cache() -> Result<Cache> {
    setup_redis_cache_at(&redis_url()).await
}

/// Initialize a Redis-backed cache against a specific URL
pub async fn setup_redis_cache_at(url: &str) -> Result<Cache> {
    let config = CacheConfig {
        backend: BackendKind::Redis,
        redis_url: url.to_string(),
        ..CacheConfig::default()
    };
    Ok(Cache::connect(&config).await?)
}

/// Initialize a MongoDB-backed cache against a live instance
pub async fn setup_mongo_cache() -> Result<Cache> {
    let config = CacheConfig {
        backend: BackendKind::MongoDb,
        mongodb_uri: mongodb_uri(),
        ..CacheConfig::default()
    };
    Ok(Cache::connect(&config).await?)
}

/// Poll the backend until it reports healthy or the timeout passes
pub async fn wait_until_healthy(cache: &Cache, timeout_ms: u64) -> bool {
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if cache.health_check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    false
}

/// Generate test data shaped like upstream API responses
pub mod test_data {
    /// Summoner-shaped JSON payload
    pub fn json_summoner(id: u64) -> serde_json::Value {
        serde_json::json!({
            "puuid": format!("puuid-{}", id),
            "name": format!("Summoner {}", id),
            "summonerLevel": 30 + id,
            "revisionDate": 1_736_000_000_000_u64 + id
        })
    }

    /// Match-list-shaped JSON payload
    pub fn json_match_list(count: u64) -> serde_json::Value {
        let matches: Vec<String> = (0..count)
            .map(|i| format!("NA1_{}", 4_000_000_000_u64 + i))
            .collect();
        serde_json::json!({
            "matches": matches,
            "startIndex": 0,
            "totalGames": count
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let key1 = test_key("summoner");
        let key2 = test_key("summoner");
        assert_ne!(key1, key2, "Keys should be unique");
        assert!(key1.starts_with("test_summoner_"));
    }

    #[test]
    fn test_data_generation() {
        let summoner = test_data::json_summoner(7);
        assert_eq!(summoner["summonerLevel"], 37);
        assert_eq!(test_data::json_match_list(3)["totalGames"], 3);
    }
}
