//! Redis integration tests
//!
//! These verify the Redis backend against a live instance, including the
//! exact wire format other consumers of the shared database observe. They
//! are ignored by default; run them with `cargo test -- --ignored` once a
//! Redis server is reachable at `REDIS_URL`.

mod common;

use common::*;
use redis::AsyncCommands;
use riot_api_cache::SetStatus;
use std::time::Duration;

/// Key prefix the backend writes under, visible to other Redis consumers.
const WIRE_PREFIX: &str = "fm-riot-api-";

async fn raw_connection(url: &str) -> redis::aio::MultiplexedConnection {
    let client = redis::Client::open(url).expect("invalid Redis URL");
    client
        .get_multiplexed_async_connection()
        .await
        .expect("Redis unavailable")
}

async fn raw_ttl(conn: &mut redis::aio::MultiplexedConnection, wire_key: &str) -> i64 {
    redis::cmd("TTL")
        .arg(wire_key)
        .query_async(conn)
        .await
        .expect("TTL command failed")
}

/// Test basic set and get round trip
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_set_then_get_round_trips() {
    let cache = setup_redis_cache().await.expect("Failed to setup cache");
    let key = test_key("redis_round_trip");
    let value = serde_json::json!({"a": 1});

    let status = cache
        .set(&key, value.clone(), Duration::from_millis(5000))
        .await
        .expect("Failed to set value");
    assert_eq!(status, SetStatus::Acknowledged);

    let cached = cache.get(&key).await.expect("Failed to get value");
    assert_eq!(cached, Some(value));
}

/// Test that a lookup of an unknown key is a miss, not an error
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_missing_key_is_none() {
    let cache = setup_redis_cache().await.unwrap();

    let cached = cache.get(&test_key("redis_missing")).await.unwrap();
    assert_eq!(cached, None);
}

/// Test the wire format: prefixed key, JSON text payload, server-side TTL
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_wire_format_uses_prefix_and_setex() {
    let cache = setup_redis_cache().await.unwrap();
    let key = test_key("redis_wire");
    let value = serde_json::json!({"a": 1});

    cache
        .set(&key, value.clone(), Duration::from_millis(5000))
        .await
        .unwrap();

    let mut conn = raw_connection(&redis_url()).await;
    let wire_key = format!("{WIRE_PREFIX}{key}");

    // Stored under the namespaced key as JSON text
    let raw: Option<String> = conn.get(&wire_key).await.unwrap();
    let raw = raw.expect("namespaced key not found");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, value);

    // The caller's bare key is never written
    let bare: Option<String> = conn.get(&key).await.unwrap();
    assert_eq!(bare, None);

    // Expiry lives on the server
    let ttl = raw_ttl(&mut conn, &wire_key).await;
    assert!((1..=5).contains(&ttl), "expected TTL near 5s, got {ttl}");
}

/// Test that a zero TTL stores the entry with no server-side expiry
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_zero_ttl_persists_without_expiry() {
    let cache = setup_redis_cache().await.unwrap();
    let key = test_key("redis_forever");
    let value = test_data::json_summoner(1);

    cache.set(&key, value.clone(), Duration::ZERO).await.unwrap();

    let mut conn = raw_connection(&redis_url()).await;
    let wire_key = format!("{WIRE_PREFIX}{key}");

    let ttl = raw_ttl(&mut conn, &wire_key).await;
    assert_eq!(ttl, -1, "expected no expiry, got TTL {ttl}");
    assert_eq!(cache.get(&key).await.unwrap(), Some(value));

    // Cleanup
    let _: Result<(), _> = conn.del(&wire_key).await;
}

/// Test that sub-second TTLs round up instead of erroring or never expiring
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_subsecond_ttl_rounds_up_to_one_second() {
    let cache = setup_redis_cache().await.unwrap();
    let key = test_key("redis_subsecond");

    cache
        .set(&key, test_data::json_summoner(2), Duration::from_millis(250))
        .await
        .unwrap();

    let mut conn = raw_connection(&redis_url()).await;
    let ttl = raw_ttl(&mut conn, &format!("{WIRE_PREFIX}{key}")).await;
    assert!((0..=1).contains(&ttl), "expected ~1s TTL, got {ttl}");
}

/// Test that an entry disappears once its TTL elapses
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_entry_expires_after_ttl() {
    let cache = setup_redis_cache().await.unwrap();
    let key = test_key("redis_expiry");
    let value = test_data::json_summoner(3);

    cache
        .set(&key, value.clone(), Duration::from_millis(1000))
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(value));

    tokio::time::sleep(Duration::from_millis(1600)).await;

    assert_eq!(cache.get(&key).await.unwrap(), None);
}

/// Test that a repeat set replaces both the value and the expiry
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_set_overwrites_value_and_ttl() {
    let cache = setup_redis_cache().await.unwrap();
    let key = test_key("redis_overwrite");
    let second = test_data::json_summoner(5);

    cache
        .set(&key, test_data::json_summoner(4), Duration::from_millis(5000))
        .await
        .unwrap();
    cache.set(&key, second.clone(), Duration::ZERO).await.unwrap();

    let mut conn = raw_connection(&redis_url()).await;
    let wire_key = format!("{WIRE_PREFIX}{key}");

    let ttl = raw_ttl(&mut conn, &wire_key).await;
    assert_eq!(ttl, -1, "rewrite should have dropped the expiry");
    assert_eq!(cache.get(&key).await.unwrap(), Some(second));

    // Cleanup
    let _: Result<(), _> = conn.del(&wire_key).await;
}

/// Test that non-object payloads survive the text codec
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_non_object_payloads_round_trip() {
    let cache = setup_redis_cache().await.unwrap();

    let payloads = vec![
        serde_json::json!("plain text"),
        serde_json::json!(42),
        serde_json::json!([1, 2, 3]),
        serde_json::json!(null),
    ];

    for (index, payload) in payloads.into_iter().enumerate() {
        let key = test_key(&format!("redis_payload_{index}"));
        cache
            .set(&key, payload.clone(), Duration::from_millis(5000))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(payload));
    }
}

/// Test that flush clears the entire selected database
///
/// Runs against `REDIS_FLUSH_URL` (database 15 by default) because the
/// flush takes unrelated keys in the same database with it.
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_flush_clears_selected_database() {
    let flush_url = redis_flush_url();
    let cache = setup_redis_cache_at(&flush_url).await.unwrap();
    let first = test_key("redis_flush_a");
    let second = test_key("redis_flush_b");
    let unrelated = test_key("unrelated_system_key");

    cache
        .set(&first, test_data::json_summoner(6), Duration::ZERO)
        .await
        .unwrap();
    cache
        .set(&second, test_data::json_summoner(7), Duration::ZERO)
        .await
        .unwrap();

    let mut conn = raw_connection(&flush_url).await;
    let _: () = conn.set(&unrelated, "keep me").await.unwrap();

    cache.flush().await.expect("Failed to flush");

    assert_eq!(cache.get(&first).await.unwrap(), None);
    assert_eq!(cache.get(&second).await.unwrap(), None);

    // Database-wide flush removes keys outside the cache namespace too
    let survivor: Option<String> = conn.get(&unrelated).await.unwrap();
    assert_eq!(survivor, None);
}

/// Test health check against a live instance
#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_health_check() {
    let cache = setup_redis_cache().await.unwrap();

    let healthy = cache.health_check().await;
    assert!(healthy, "Redis backend should be healthy");
}

/// Test that an unreachable server surfaces as a connection error
#[tokio::test]
async fn test_unreachable_server_fails_to_connect() {
    let result = setup_redis_cache_at("redis://127.0.0.1:1").await;
    assert!(result.is_err(), "connect to a closed port should fail");
}
