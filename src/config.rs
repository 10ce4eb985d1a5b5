//! Backend selection configuration
//!
//! The surrounding application owns configuration loading and validation;
//! this module only defines the shape it hands over: which backend to run
//! and the opaque connection strings for the remote ones. Connection strings
//! are passed through to the drivers untouched.

use serde::Deserialize;
use tracing::warn;

/// Which storage backend the cache should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local map with lazily checked expiry. Needs no services.
    #[default]
    Memory,
    /// Remote Redis instance; expiry delegated to native key TTLs.
    Redis,
    /// MongoDB collection; expiry delegated to a TTL index sweep.
    MongoDb,
}

impl BackendKind {
    /// Diagnostic label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
            Self::MongoDb => "mongodb",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            "mongodb" | "mongo" => Some(Self::MongoDb),
            _ => None,
        }
    }
}

/// Cache configuration handed over by the application's config layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend to construct. Defaults to [`BackendKind::Memory`].
    pub backend: BackendKind,
    /// Redis connection string, used when `backend` is `redis`.
    pub redis_url: String,
    /// MongoDB connection string, used when `backend` is `mongodb`.
    pub mongodb_uri: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            mongodb_uri: "mongodb://127.0.0.1:27017".to_string(),
        }
    }
}

impl CacheConfig {
    /// Build a configuration from `CACHE_BACKEND`, `REDIS_URL`, and
    /// `MONGODB_URI`, falling back to defaults for anything unset.
    ///
    /// An unrecognized `CACHE_BACKEND` keeps the default backend rather than
    /// failing; the value is logged so a typo does not pass silently.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CACHE_BACKEND") {
            match BackendKind::parse(&raw) {
                Some(kind) => config.backend = kind,
                None => {
                    warn!(value = %raw, "Unrecognized CACHE_BACKEND value, keeping default backend");
                }
            }
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis_url = url;
        }
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.mongodb_uri = uri;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.mongodb_uri, "mongodb://127.0.0.1:27017");
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse("memory"), Some(BackendKind::Memory));
        assert_eq!(BackendKind::parse("Redis"), Some(BackendKind::Redis));
        assert_eq!(BackendKind::parse(" mongodb "), Some(BackendKind::MongoDb));
        assert_eq!(BackendKind::parse("mongo"), Some(BackendKind::MongoDb));
        assert_eq!(BackendKind::parse("memcached"), None);
    }

    #[test]
    fn test_config_deserialization() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"backend": "redis", "redis_url": "redis://cache:6379"}"#)
                .unwrap();
        assert_eq!(config.backend, BackendKind::Redis);
        assert_eq!(config.redis_url, "redis://cache:6379");
        // Unspecified fields keep their defaults
        assert_eq!(config.mongodb_uri, "mongodb://127.0.0.1:27017");
    }
}
