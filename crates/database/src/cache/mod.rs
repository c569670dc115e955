//! Read-through response cache.
//!
//! The cache is advisory. Every failure inside it is logged and turned into a
//! miss (reads) or ignored (writes and invalidations), so the authority store
//! always stays the fallback.

pub mod backend;
pub mod key;

pub use backend::{CacheBackend, CacheError};
pub use key::CacheKey;

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use std::{future::Future, time::Duration};

#[derive(Clone)]
pub struct Cache {
    backend: CacheBackend,
    ttl: Duration,
}

impl Cache {
    /// How long list views may lag behind writes
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(backend: CacheBackend, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// In-process cache with the default TTL
    pub fn local() -> Self {
        Self::new(CacheBackend::new_local(), Self::DEFAULT_TTL)
    }

    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    /// Errors from `compute` are returned as-is and never cached.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.store(key, &value).await;
        Ok(value)
    }

    /// Removes `key` after a committed write. Failures are logged and
    /// swallowed so the write itself still succeeds.
    pub async fn invalidate(&self, key: &CacheKey) {
        match self.backend.delete(key.as_str()).await {
            Ok(removed) => debug!("cache invalidated {key} (present: {removed})"),
            Err(e) => warn!("cache invalidation failed for {key}: {e}"),
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw = match self.backend.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("cache miss {key}");
                return None;
            }
            Err(e) => {
                warn!("cache read failed for {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("cache hit {key}");
                Some(value)
            }
            Err(e) => {
                warn!("discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let result = match serde_json::to_string(value) {
            Ok(raw) => self.backend.set(key.as_str(), raw, self.ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };

        if let Err(e) = result {
            warn!("cache write failed for {key}: {e}");
        }
    }
}
