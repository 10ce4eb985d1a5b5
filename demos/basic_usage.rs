//! Basic Usage Example
//!
//! Demonstrates simple cache operations: set, get, flush, and health check.
//!
//! Run with: cargo run --example basic_usage

use riot_api_cache::{Cache, CacheConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Riot API Cache: Basic Usage ===\n");

    // 1. Initialize cache (default: in-memory backend)
    let cache = Cache::connect(&CacheConfig::default()).await?;
    println!("Backend: {}\n", cache.name());

    // 2. Health check
    if cache.health_check().await {
        println!("✅ Cache is healthy\n");
    }

    // 3. Store an API response for one minute
    let summoner = serde_json::json!({
        "puuid": "qDvtLq8Zn1Te...",
        "name": "Hide on bush",
        "summonerLevel": 743
    });

    println!("Storing summoner response with a 60s TTL...");
    cache
        .set("summoner-kr-hide-on-bush", summoner, Duration::from_millis(60_000))
        .await?;
    println!();

    // 4. Retrieve it
    println!("Retrieving summoner response...");
    if let Some(cached) = cache.get("summoner-kr-hide-on-bush").await? {
        println!("✅ Retrieved from cache: {cached}");
    }
    println!();

    // 5. Store static data that never expires
    let champions = serde_json::json!({"Ahri": 103, "Annie": 1, "Zed": 238});
    println!("Storing champion list with no expiry...");
    cache.set("champion-ids", champions, Duration::ZERO).await?;
    println!();

    // 6. Cache statistics
    let stats = cache.stats();
    println!("=== Cache Statistics ===");
    println!("Hits: {}", stats.hits);
    println!("Misses: {}", stats.misses);
    println!("Sets: {}", stats.sets);
    println!("Expired on read: {}", stats.expired);
    println!();

    // 7. Drop everything
    println!("Flushing cache...");
    cache.flush().await?;
    println!("Entry after flush: {:?}", cache.get("champion-ids").await?);

    Ok(())
}
