//! Cache module
//!
//! Pluggable backends behind [`CacheBackend`]:
//! - In-memory (default), using moka
//! - Redis, using deadpool-redis
//!
//! [`CacheService`] adds a typed API on top using MessagePack.

mod backend;
mod error;
mod key;
mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use key::CacheKey;

use memory::InMemoryCache;

use crate::core::config::{CacheBackendType, CacheConfig};

/// Cache service shared by repositories and the analytics service
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    /// Create a new cache service from configuration
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendType::Memory => {
                tracing::debug!(
                    max_entries = config.max_entries,
                    "Initializing in-memory cache"
                );
                Arc::new(InMemoryCache::new(config.max_entries))
            }
            CacheBackendType::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or(CacheError::MissingRedisUrl)?;
                Arc::new(redis::RedisCache::new(url).await?)
            }
        };

        Ok(Self { backend })
    }

    /// In-memory cache with the given capacity
    pub fn in_memory(max_entries: u64) -> Self {
        Self {
            backend: Arc::new(InMemoryCache::new(max_entries)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    // =========================================================================
    // Raw bytes API
    // =========================================================================

    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    pub async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    // =========================================================================
    // Typed API (MessagePack)
    // =========================================================================

    /// Get a typed value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let value = rmp_serde::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes = rmp_serde::to_vec(value)?;
        self.set_raw(key, bytes, ttl).await
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(key).await
    }

    /// Delete a key, logging instead of returning failures.
    pub async fn invalidate_key(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key).await
    }

    /// Invalidate keys matching a pattern
    pub async fn invalidate(&self, pattern: &str) -> Result<u64, CacheError> {
        self.backend.delete_pattern(pattern).await
    }

    pub async fn health_check(&self) -> Result<(), CacheError> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> CacheConfig {
        CacheConfig {
            backend: CacheBackendType::Memory,
            max_entries: 1000,
            redis_url: None,
        }
    }

    #[tokio::test]
    async fn test_cache_service_backend_name() {
        let service = CacheService::new(&memory_config()).await.unwrap();
        assert_eq!(service.backend_name(), "memory");
        assert_eq!(format!("{service:?}"), "CacheService { backend: \"memory\" }");
    }

    #[tokio::test]
    async fn test_redis_without_url_is_config_error() {
        let config = CacheConfig {
            backend: CacheBackendType::Redis,
            max_entries: 1000,
            redis_url: None,
        };
        let err = CacheService::new(&config).await.unwrap_err();
        assert!(matches!(err, CacheError::MissingRedisUrl));
    }

    #[tokio::test]
    async fn test_typed_get_set() {
        #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
        struct Learner {
            id: String,
            name: String,
        }

        let service = CacheService::in_memory(100);
        let learner = Learner {
            id: "u1".to_string(),
            name: "Ada".to_string(),
        };

        service.set("learner:1", &learner, None).await.unwrap();
        let fetched: Option<Learner> = service.get("learner:1").await.unwrap();
        assert_eq!(fetched, Some(learner));
    }

    #[tokio::test]
    async fn test_typed_get_rejects_garbage() {
        let service = CacheService::in_memory(100);
        service
            .set_raw("bad", vec![0xc1], None)
            .await
            .unwrap();
        let result: Result<Option<Vec<u64>>, _> = service.get("bad").await;
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[tokio::test]
    async fn test_invalidate_key_and_pattern() {
        let service = CacheService::in_memory(100);
        service.set_raw("v1:user:1", b"a".to_vec(), None).await.unwrap();
        service.set_raw("v1:user:2", b"b".to_vec(), None).await.unwrap();
        service.set_raw("v1:analytics:users", b"c".to_vec(), None).await.unwrap();

        service.invalidate_key("v1:user:1").await;
        assert!(!service.exists("v1:user:1").await.unwrap());

        assert_eq!(service.invalidate("v1:user:*").await.unwrap(), 1);
        assert!(service.exists("v1:analytics:users").await.unwrap());
        assert!(service.health_check().await.is_ok());
    }
}
