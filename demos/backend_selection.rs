//! Backend Selection Example
//!
//! Demonstrates picking the storage engine from the environment. The same
//! code path serves all three backends; only the configuration changes.
//!
//! Run with:
//!   cargo run --example backend_selection
//!   CACHE_BACKEND=redis REDIS_URL=redis://127.0.0.1:6379 cargo run --example backend_selection
//!   CACHE_BACKEND=mongodb MONGODB_URI=mongodb://127.0.0.1:27017 cargo run --example backend_selection

use riot_api_cache::Cache;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Riot API Cache: Backend Selection ===\n");

    // CACHE_BACKEND picks the engine: memory (default), redis, or mongodb
    let cache = Cache::from_env().await?;
    println!("Selected backend: {}\n", cache.name());

    if !cache.health_check().await {
        println!("⚠️  Backend is not healthy yet, proceeding anyway\n");
    }

    // The contract is identical regardless of the backend
    let rank = serde_json::json!({
        "tier": "CHALLENGER",
        "leaguePoints": 1247,
        "wins": 312
    });

    println!("Storing ranked entry with a 5s TTL...");
    cache
        .set("league-entry-kr-faker", rank.clone(), Duration::from_millis(5000))
        .await?;

    let cached = cache.get("league-entry-kr-faker").await?;
    println!("Read back: {}", cached.map_or_else(|| "miss".to_string(), |v| v.to_string()));

    println!("\nWaiting out the TTL...");
    tokio::time::sleep(Duration::from_millis(6000)).await;

    let expired = cache.get("league-entry-kr-faker").await?;
    match expired {
        Some(value) => println!("Still cached (expiry lagging): {value}"),
        None => println!("✅ Entry expired as expected"),
    }

    Ok(())
}
