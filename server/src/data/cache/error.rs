//! Cache errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis cache backend selected without a redis_url")]
    MissingRedisUrl,

    #[error("Redis unavailable: {0}")]
    Connection(String),

    /// Cached entries are MessagePack; a stale or foreign entry fails here
    #[error("Cached value could not be decoded: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Value could not be encoded for the cache: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Redis command failed: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
}
