//! Cache backend trait definition

use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;

/// Cache backend trait
///
/// Both the in-memory and Redis backends implement this trait. Values are
/// opaque byte strings; typed access lives in [`super::CacheService`].
///
/// Operations on individual keys are atomic, but the return values of
/// `delete` and `exists` may already be stale when the caller sees them.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from the cache
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Set a value in the cache with optional TTL
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Check if a key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete keys matching a trailing-glob pattern such as `"v1:analytics:*"`
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Health check (validates connection)
    async fn health_check(&self) -> Result<(), CacheError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
