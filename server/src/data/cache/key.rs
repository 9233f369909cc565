//! Versioned cache keys

use crate::core::constants::CACHE_KEY_VERSION;
use crate::data::types::EntityKind;

/// Cache key builder
///
/// Every key starts with [`CACHE_KEY_VERSION`] so a format change can be
/// rolled out by bumping the version instead of flushing the store.
pub struct CacheKey;

impl CacheKey {
    /// Cached user record
    pub fn user(id: &str) -> String {
        format!("{}:user:{}", CACHE_KEY_VERSION, id)
    }

    /// Marker for a user id known not to exist
    pub fn user_negative(id: &str) -> String {
        format!("{}:user:neg:{}", CACHE_KEY_VERSION, id)
    }

    /// Cached course record, ratings included
    pub fn course(id: &str) -> String {
        format!("{}:course:{}", CACHE_KEY_VERSION, id)
    }

    /// Trailing 12-month series for one entity kind
    pub fn analytics(kind: EntityKind) -> String {
        format!("{}:analytics:{}", CACHE_KEY_VERSION, kind.as_str())
    }

    /// Pattern matching every analytics series
    pub fn analytics_pattern() -> String {
        format!("{}:analytics:*", CACHE_KEY_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keys() {
        assert_eq!(CacheKey::user("abc"), "v1:user:abc");
        assert_eq!(CacheKey::user_negative("abc"), "v1:user:neg:abc");
    }

    #[test]
    fn test_course_key() {
        assert_eq!(CacheKey::course("c1"), "v1:course:c1");
        assert_ne!(CacheKey::course("x"), CacheKey::user("x"));
    }

    #[test]
    fn test_analytics_keys() {
        assert_eq!(CacheKey::analytics(EntityKind::Users), "v1:analytics:users");
        assert_eq!(
            CacheKey::analytics(EntityKind::Courses),
            "v1:analytics:courses"
        );
        assert_eq!(CacheKey::analytics(EntityKind::Orders), "v1:analytics:orders");
    }

    #[test]
    fn test_analytics_pattern_covers_every_kind() {
        let prefix = CacheKey::analytics_pattern();
        let prefix = prefix.trim_end_matches('*');
        for kind in EntityKind::all() {
            assert!(CacheKey::analytics(*kind).starts_with(prefix));
        }
    }

    #[test]
    fn test_user_keys_do_not_collide() {
        assert_ne!(CacheKey::user("x"), CacheKey::user_negative("x"));
    }
}
