//! Cache store backends: an in-process DashMap, or Redis through a pool.

use dashmap::DashMap;
use deadpool_redis::{Pool, PoolError};
use log::{info, warn};
use redis::{AsyncCommands, RedisError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure inside the cache side channel. Never escapes [`super::Cache`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to get redis connection: {0}")]
    Pool(#[from] PoolError),

    #[error("redis command failed: {0}")]
    Redis(#[from] RedisError),

    #[error("failed to encode cache value: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct CachedEntry {
    data: String,
    expires_at: Instant,
}

impl CachedEntry {
    fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Clone)]
pub enum CacheBackend {
    /// Single instance, nothing shared across processes
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Shared Redis store
    Redis(Pool),
}

impl CacheBackend {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    pub fn new_redis(pool: Pool) -> Self {
        CacheBackend::Redis(pool)
    }

    /// Connects to Redis when a URL is configured, falling back to the local
    /// backend when Redis is disabled or the pool cannot be built
    pub async fn connect(redis_url: Option<&str>, pool_size: usize) -> Self {
        let Some(url) = redis_url else {
            info!("Redis disabled, using local cache only");
            return Self::new_local();
        };

        let mut pool_config = deadpool_redis::PoolConfig::new(pool_size);
        pool_config.timeouts.wait = Some(Self::CONNECT_TIMEOUT);
        pool_config.timeouts.create = Some(Self::CONNECT_TIMEOUT);
        pool_config.timeouts.recycle = Some(Self::CONNECT_TIMEOUT);

        let mut config = deadpool_redis::Config::from_url(url);
        config.pool = Some(pool_config);

        let pool = match config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Failed to create Redis pool, falling back to local cache: {e}");
                return Self::new_local();
            }
        };

        let backend = Self::new_redis(pool);
        match backend.ping().await {
            Ok(()) => info!("Connected to Redis"),
            // Keep the Redis backend: the cache is advisory and may come back
            Err(e) => warn!("Redis ping failed, cache reads will miss until it recovers: {e}"),
        }

        backend
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CacheBackend::Local(_) => "local",
            CacheBackend::Redis(_) => "redis",
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Local(map) => {
                if map.remove_if(key, |_, entry| entry.is_expired()).is_some() {
                    return Ok(None);
                }

                Ok(map
                    .get(key)
                    .filter(|entry| !entry.is_expired())
                    .map(|entry| entry.data.clone()))
            }
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                Ok(conn.get::<_, Option<String>>(key).await?)
            }
        }
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local(map) => {
                // keys that are never read again would otherwise stay forever
                map.retain(|_, entry| !entry.is_expired());
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
                Ok(())
            }
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                // Redis rejects a zero expiry
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
                Ok(())
            }
        }
    }

    /// Removes a key, returning whether it was present
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            CacheBackend::Local(map) => Ok(map.remove(key).is_some()),
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let removed: usize = conn.del(key).await?;
                Ok(removed > 0)
            }
        }
    }

    /// Liveness check
    pub async fn ping(&self) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local(_) => Ok(()),
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::cache::backend::CacheBackend;
    use std::time::Duration;

    #[tokio::test]
    async fn test_local_get_set_delete() {
        let backend = CacheBackend::new_local();
        assert_eq!(backend.mode(), "local");

        backend
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));

        assert!(backend.delete("k").await.unwrap());
        assert!(!backend.delete("k").await.unwrap());
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_entry_expires() {
        let backend = CacheBackend::new_local();
        backend
            .set("k", "v".to_string(), Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_set_sweeps_expired_entries() {
        let backend = CacheBackend::new_local();
        for page in 0..100 {
            backend
                .set(&format!("list:page={page}"), "[]".to_string(), Duration::from_millis(10))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        backend
            .set("list:page=fresh", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let CacheBackend::Local(map) = &backend else {
            panic!("expected local backend");
        };
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("list:page=fresh"));
    }

    #[tokio::test]
    async fn test_unreachable_redis_reports_errors() {
        let backend = CacheBackend::connect(Some("redis://127.0.0.1:1"), 1).await;
        assert_eq!(backend.mode(), "redis");
        assert!(backend.ping().await.is_err());
        assert!(backend.get("k").await.is_err());
    }
}
