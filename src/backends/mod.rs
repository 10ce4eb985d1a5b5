//! Cache Backend Implementations
//!
//! One module per storage engine, all exposing the same inherent API
//! (`get`, `set`, `flush`, `health_check`, `stats`) plus a
//! [`CacheStore`](crate::traits::CacheStore) implementation:
//!
//! - [`memory_cache`]: process-local `DashMap` with lazy expiry checks
//! - [`redis_cache`]: shared Redis database, expiry delegated to `SETEX`
//! - [`mongo_cache`]: MongoDB collection, expiry delegated to a TTL index

pub mod memory_cache;
pub mod mongo_cache;
pub mod redis_cache;

// Re-export backend types
pub use memory_cache::InMemoryCache;
pub use mongo_cache::MongoCache;
pub use redis_cache::RedisCache;
