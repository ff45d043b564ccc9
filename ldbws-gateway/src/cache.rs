//! Cache stores for normalized responses.
//!
//! The gateway only needs `get` and `set` with a per-key TTL; expiry is left
//! entirely to the store. Three backends are provided:
//! - [`MemoryStore`]: in-process moka cache, for a single node
//! - [`RedisStore`]: a shared Redis instance (`GET` / `SETEX`)
//! - [`NullStore`]: never stores anything, turning the gateway into a pure proxy

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use redis::aio::ConnectionManager;

/// Default TTL for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Errors from talking to a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// A key/value store with store-managed expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`; `None` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store `value` under `key`, expiring `ttl` after this call.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

/// Configuration for the in-process cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    body: Bytes,
    ttl: Duration,
}

/// Expires every entry `ttl` after it was last written.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka.
#[derive(Clone)]
pub struct MemoryStore {
    entries: MokaCache<String, Entry>,
}

impl MemoryStore {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| entry.body))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), Entry { body: value, ttl })
            .await;
        Ok(())
    }
}

/// Cache backed by a Redis server.
///
/// Every operation is bounded by `timeout`; the connection manager
/// reconnects on its own after failures.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://cache:6379/0`).
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(timeout))??;

        Ok(Self {
            connection,
            timeout,
        })
    }

    async fn run<T: redis::FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T, CacheError> {
        let mut connection = self.connection.clone();
        let value = tokio::time::timeout(self.timeout, cmd.query_async(&mut connection))
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))??;
        Ok(value)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        let value: Option<Vec<u8>> = self.run(cmd).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut cmd = redis::cmd("SETEX");
        cmd.arg(key).arg(ttl.as_secs().max(1)).arg(value.as_ref());
        self.run::<()>(cmd).await
    }
}

/// Store that never holds anything: every `get` misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_capacity, 10_000);
        assert_eq!(DEFAULT_TTL, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn memory_store_get_and_set() {
        let store = MemoryStore::new(&CacheConfig::default());

        assert_eq!(store.get("/departure-board/KGX").await.unwrap(), None);

        store
            .set("/departure-board/KGX", Bytes::from_static(b"{}"), DEFAULT_TTL)
            .await
            .unwrap();

        assert_eq!(
            store.get("/departure-board/KGX").await.unwrap(),
            Some(Bytes::from_static(b"{}"))
        );
        assert_eq!(store.get("/departure-board/kgx").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_last_write_wins() {
        let store = MemoryStore::new(&CacheConfig::default());
        store
            .set("k", Bytes::from_static(b"first"), DEFAULT_TTL)
            .await
            .unwrap();
        store
            .set("k", Bytes::from_static(b"second"), DEFAULT_TTL)
            .await
            .unwrap();

        assert_eq!(
            store.get("k").await.unwrap(),
            Some(Bytes::from_static(b"second"))
        );
    }

    #[tokio::test]
    async fn memory_store_entries_expire() {
        let store = MemoryStore::new(&CacheConfig::default());
        store
            .set("short", Bytes::from_static(b"a"), Duration::from_millis(50))
            .await
            .unwrap();
        store
            .set("long", Bytes::from_static(b"b"), DEFAULT_TTL)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(
            store.get("long").await.unwrap(),
            Some(Bytes::from_static(b"b"))
        );
    }

    #[tokio::test]
    async fn null_store_always_misses() {
        let store = NullStore;
        store
            .set("k", Bytes::from_static(b"v"), DEFAULT_TTL)
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn redis_connect_to_bad_url_fails() {
        let result = RedisStore::connect("not-a-redis-url", Duration::from_millis(200)).await;
        assert!(result.is_err());
    }
}
