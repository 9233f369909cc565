//! SQLite repositories
//!
//! Free functions over a pool and an optional cache. Row types live in
//! `crate::data::types`.

pub mod analytics;
pub mod course;
pub mod order;
pub mod thread;
pub mod user;

use crate::data::cache::CacheService;

/// Drop cache entries after a successful write. Failures are logged only.
async fn invalidate(cache: Option<&CacheService>, keys: &[String]) {
    if let Some(cache) = cache {
        for key in keys {
            cache.invalidate_key(key).await;
        }
    }
}
