//! Document-Store Backend
//!
//! MongoDB-backed cache with index-driven expiry. Construction starts a
//! one-time bootstrap (connect, select the database, ensure the collection
//! and its two indexes) and every operation awaits that same bootstrap
//! before touching the collection; the server's TTL monitor deletes expired
//! documents in the background, so nothing is checked at read time.
//!
//! The bootstrap outcome is memoized: concurrent early callers converge on a
//! single in-flight attempt, and a failure is recorded and surfaced by every
//! subsequent operation instead of leaving the backend half-initialized.

use crate::error::{CacheError, CacheResult};
use crate::traits::{CacheStats, SetStatus};
use mongodb::bson::{DateTime, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Fixed logical database holding the cache collection.
const DATABASE_NAME: &str = "fm-riot-api";
/// Fixed collection name; one document per cached key.
const COLLECTION_NAME: &str = "cache";
/// Name of the uniqueness index on the key field.
const KEY_INDEX_NAME: &str = "cache_key_unique";
/// Name of the TTL index on the expiry field.
const EXPIRY_INDEX_NAME: &str = "cache_expires_at_ttl";
/// Server code for "collection already exists".
const NAMESPACE_EXISTS: i32 = 48;

/// Storage envelope for one cached entry.
///
/// `expiresAt` is omitted entirely (not stored as null) for never-expiring
/// entries; the TTL index only considers documents carrying the field.
#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    key: String,
    value: serde_json::Value,
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime>,
}

/// Absolute expiry for a relative TTL; `None` when the entry never expires.
fn expires_at(ttl: Duration) -> Option<DateTime> {
    (!ttl.is_zero()).then(|| DateTime::from_system_time(SystemTime::now() + ttl))
}

/// Handles published by a successful bootstrap.
struct MongoHandles {
    database: Database,
    collection: Collection<CacheDocument>,
}

/// MongoDB cache backend.
///
/// State machine: uninitialized → connecting → bootstrapping → ready, with a
/// sticky failure terminal reachable from any step. `connect` returns
/// immediately in the uninitialized state and kicks the sequence off; `get`,
/// `set`, and `flush` all await the shared completion before touching the
/// collection.
pub struct MongoCache {
    mongodb_uri: String,
    /// Memoized bootstrap outcome; holds the rendered failure message so a
    /// failed bootstrap keeps failing every later call.
    bootstrap: Arc<OnceCell<Result<(), String>>>,
    /// Database and collection handles published by a successful bootstrap.
    handles: Arc<OnceLock<MongoHandles>>,
    /// Hit counter
    hits: Arc<AtomicU64>,
    /// Miss counter
    misses: Arc<AtomicU64>,
    /// Set counter
    sets: Arc<AtomicU64>,
}

impl MongoCache {
    /// Create the backend and start its bootstrap in the background.
    ///
    /// Operations issued before the bootstrap finishes wait for it rather
    /// than failing or spawning duplicate attempts.
    ///
    /// # Panics
    ///
    /// Must be called within a tokio runtime; the bootstrap task is spawned
    /// onto it.
    #[must_use]
    pub fn connect(mongodb_uri: &str) -> Self {
        info!(mongodb_uri = %mongodb_uri, "Initializing MongoDB cache backend");

        let cache = Self {
            mongodb_uri: mongodb_uri.to_string(),
            bootstrap: Arc::new(OnceCell::new()),
            handles: Arc::new(OnceLock::new()),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            sets: Arc::new(AtomicU64::new(0)),
        };

        let bootstrap = Arc::clone(&cache.bootstrap);
        let slot = Arc::clone(&cache.handles);
        let uri = cache.mongodb_uri.clone();
        tokio::spawn(async move {
            let _ = bootstrap.get_or_init(|| run_bootstrap(uri, slot)).await;
        });

        cache
    }

    /// Await the shared bootstrap and surface its recorded outcome.
    async fn ensure_ready(&self) -> CacheResult<()> {
        let outcome = self
            .bootstrap
            .get_or_init(|| run_bootstrap(self.mongodb_uri.clone(), Arc::clone(&self.handles)))
            .await;
        match outcome {
            Ok(()) => Ok(()),
            Err(message) => Err(CacheError::bootstrap(message.clone())),
        }
    }

    /// Collection handle, present once bootstrap succeeded.
    ///
    /// A successful bootstrap that never published the handles is an internal
    /// invariant violation, reported as [`CacheError::Uninitialized`].
    fn collection(&self) -> CacheResult<&Collection<CacheDocument>> {
        self.handles
            .get()
            .map(|handles| &handles.collection)
            .ok_or(CacheError::Uninitialized)
    }

    /// Get the cached value for `key`.
    ///
    /// Returns only the stored value; the storage envelope (`key`,
    /// `expiresAt`) never escapes. A document past its expiry may still be
    /// visible briefly until the server sweep removes it.
    ///
    /// # Errors
    ///
    /// Returns an error when bootstrap failed or the lookup fails; a missing
    /// document is `Ok(None)`.
    pub async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        self.ensure_ready().await?;
        let collection = self.collection()?;

        match collection.find_one(doc! { "key": key }).await? {
            Some(document) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(document.value))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Upsert the entry for `key`, replacing `key`, `value`, and `expiresAt`
    /// together.
    ///
    /// # Errors
    ///
    /// Returns an error when bootstrap failed or the command fails. A write
    /// the server reports as not applied is `Ok(SetStatus::Unacknowledged)`,
    /// not an error.
    pub async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        self.ensure_ready().await?;
        let collection = self.collection()?;

        let document = CacheDocument {
            key: key.to_string(),
            value,
            expires_at: expires_at(ttl),
        };
        let result = collection
            .replace_one(doc! { "key": key }, &document)
            .upsert(true)
            .await?;

        self.sets.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, ttl_ms = %ttl.as_millis(), "[MongoDB] Cached key");

        // An upsert either matched the existing document or inserted a new
        // one; anything else means the server did not apply the write.
        if result.matched_count > 0 || result.upserted_id.is_some() {
            Ok(SetStatus::Acknowledged)
        } else {
            Ok(SetStatus::Unacknowledged)
        }
    }

    /// Delete every document in the cache collection.
    ///
    /// # Errors
    ///
    /// Returns an error when bootstrap failed or the delete fails.
    pub async fn flush(&self) -> CacheResult<()> {
        self.ensure_ready().await?;
        let collection = self.collection()?;

        let result = collection.delete_many(doc! {}).await?;
        debug!(deleted = %result.deleted_count, "[MongoDB] Flushed cache collection");
        Ok(())
    }

    /// Probe the server with a `ping` command.
    pub async fn health_check(&self) -> bool {
        if self.ensure_ready().await.is_err() {
            return false;
        }
        match self.handles.get() {
            Some(handles) => handles.database.run_command(doc! { "ping": 1 }).await.is_ok(),
            None => false,
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

/// Run the bootstrap once and publish the handles on success.
async fn run_bootstrap(
    mongodb_uri: String,
    slot: Arc<OnceLock<MongoHandles>>,
) -> Result<(), String> {
    match bootstrap_collection(&mongodb_uri).await {
        Ok(handles) => {
            // The OnceCell rules out a second bootstrap, so the slot can only
            // be empty here.
            let _ = slot.set(handles);
            info!(
                database = DATABASE_NAME,
                collection = COLLECTION_NAME,
                "MongoDB cache backend ready"
            );
            Ok(())
        }
        Err(bootstrap_error) => {
            error!(error = %bootstrap_error, "MongoDB cache bootstrap failed");
            Err(bootstrap_error.to_string())
        }
    }
}

/// Connect and make sure the database, collection, and indexes exist.
async fn bootstrap_collection(mongodb_uri: &str) -> Result<MongoHandles, MongoError> {
    debug!(mongodb_uri = %mongodb_uri, "Connecting to MongoDB");
    let client = Client::with_uri_str(mongodb_uri).await?;
    let database = client.database(DATABASE_NAME);

    ensure_collection(&database).await?;
    let collection = database.collection::<CacheDocument>(COLLECTION_NAME);

    collection
        .create_index(
            IndexModel::builder()
                .keys(doc! { "key": 1 })
                .options(
                    IndexOptions::builder()
                        .name(KEY_INDEX_NAME.to_string())
                        .unique(true)
                        .build(),
                )
                .build(),
        )
        .await?;

    // expireAfterSeconds 0: documents are removable the moment `expiresAt`
    // passes; documents without the field are never touched.
    collection
        .create_index(
            IndexModel::builder()
                .keys(doc! { "expiresAt": 1 })
                .options(
                    IndexOptions::builder()
                        .name(EXPIRY_INDEX_NAME.to_string())
                        .expire_after(Duration::ZERO)
                        .build(),
                )
                .build(),
        )
        .await?;

    Ok(MongoHandles {
        database,
        collection,
    })
}

/// Create the cache collection unless an earlier run already did.
async fn ensure_collection(database: &Database) -> Result<(), MongoError> {
    match database.create_collection(COLLECTION_NAME).await {
        Ok(()) => Ok(()),
        Err(create_error) if is_namespace_exists(&create_error) => Ok(()),
        Err(create_error) => Err(create_error),
    }
}

fn is_namespace_exists(error: &MongoError) -> bool {
    matches!(
        *error.kind,
        ErrorKind::Command(ref command_error) if command_error.code == NAMESPACE_EXISTS
    )
}

// ===== Trait Implementations =====

use crate::traits::CacheStore;
use async_trait::async_trait;

#[async_trait]
impl CacheStore for MongoCache {
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        MongoCache::get(self, key).await
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> CacheResult<SetStatus> {
        MongoCache::set(self, key, value, ttl).await
    }

    async fn flush(&self) -> CacheResult<()> {
        MongoCache::flush(self).await
    }

    fn name(&self) -> &'static str {
        "MongoDB"
    }
}
