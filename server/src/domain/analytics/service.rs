//! Analytics series per entity kind
//!
//! Loads creation timestamps from the transactional store, aggregates them
//! at the injected clock's "now" and caches the resulting series. Writes to
//! an entity kind drop its cached series (see the repositories), so a
//! cached series is at most `cache_ttl` old with respect to the clock.

use std::sync::Arc;
use std::time::Duration;

use super::aggregator::{Aggregator, PeriodBucket};
use super::clock::Clock;
use crate::core::config::AnalyticsConfig;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::types::EntityKind;
use crate::data::{DataError, TransactionalService};

pub struct AnalyticsService {
    database: Arc<TransactionalService>,
    cache: Arc<CacheService>,
    clock: Arc<dyn Clock>,
    aggregator: Aggregator,
    cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsService")
            .field("timezone", &self.aggregator.timezone())
            .field("cache_ttl", &self.cache_ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl AnalyticsService {
    pub fn new(
        database: Arc<TransactionalService>,
        cache: Arc<CacheService>,
        clock: Arc<dyn Clock>,
        config: &AnalyticsConfig,
    ) -> Self {
        let cache_ttl = (config.cache_ttl_secs > 0).then(|| Duration::from_secs(config.cache_ttl_secs));
        Self {
            database,
            cache,
            clock,
            aggregator: Aggregator::new(config.timezone),
            cache_ttl,
        }
    }

    /// Trailing 12-month series for `kind`, oldest bucket first
    pub async fn last_12_months(&self, kind: EntityKind) -> Result<Vec<PeriodBucket>, DataError> {
        let key = CacheKey::analytics(kind);

        if self.cache_ttl.is_some() {
            match self.cache.get::<Vec<PeriodBucket>>(&key).await {
                Ok(Some(series)) => {
                    tracing::trace!(%kind, "Analytics cache hit");
                    return Ok(series);
                }
                Err(e) => tracing::warn!(%kind, error = %e, "Cache get error"),
                Ok(None) => {}
            }
        }

        let records = self.database.repository().list_created_at(kind).await?;
        let now = self.clock.now();
        let series = self.aggregator.aggregate(&records, now);

        tracing::debug!(
            %kind,
            records = records.len(),
            counted = series.iter().map(|b| b.count).sum::<u64>(),
            %now,
            "Computed analytics series"
        );

        if let Some(ttl) = self.cache_ttl
            && let Err(e) = self.cache.set(&key, &series, Some(ttl)).await
        {
            tracing::warn!(%kind, error = %e, "Cache set error");
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::test_support::{
        insert_course_at, insert_order_at, insert_user_at,
    };
    use crate::data::types::UserRole;
    use crate::domain::analytics::{BUCKET_COUNT, FixedClock};
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Tz;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn secs(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp()
    }

    async fn service(cache_ttl_secs: u64) -> (AnalyticsService, Arc<TransactionalService>) {
        let database = Arc::new(TransactionalService::in_memory().await);
        let config = AnalyticsConfig {
            timezone: Tz::UTC,
            cache_ttl_secs,
        };
        let service = AnalyticsService::new(
            Arc::clone(&database),
            Arc::new(CacheService::in_memory(100)),
            Arc::new(FixedClock::new(now())),
            &config,
        );
        (service, database)
    }

    #[tokio::test]
    async fn test_empty_store_gives_twelve_zero_buckets() {
        let (service, _db) = service(0).await;
        for kind in EntityKind::all() {
            let series = service.last_12_months(*kind).await.unwrap();
            assert_eq!(series.len(), BUCKET_COUNT);
            assert!(series.iter().all(|b| b.count == 0));
            assert_eq!(series.last().unwrap().end, now());
        }
    }

    #[tokio::test]
    async fn test_counts_per_kind() {
        let (service, db) = service(0).await;
        let pool = db.pool();
        // Newest bucket: [2024-02-16, 2024-03-15)
        insert_user_at(pool, "u1", secs(2024, 3, 1)).await;
        insert_user_at(pool, "u2", secs(2024, 2, 20)).await;
        // Previous bucket: [2024-01-18, 2024-02-15)
        insert_user_at(pool, "u3", secs(2024, 2, 1)).await;
        // Older than the oldest bucket
        insert_user_at(pool, "u4", secs(2022, 1, 1)).await;
        insert_course_at(pool, "c1", secs(2024, 3, 10)).await;
        insert_order_at(pool, "o1", "u1", "c1", secs(2024, 3, 14)).await;

        let users = service.last_12_months(EntityKind::Users).await.unwrap();
        assert_eq!(users[11].count, 2);
        assert_eq!(users[10].count, 1);
        assert_eq!(users.iter().map(|b| b.count).sum::<u64>(), 3);
        assert_eq!(users[11].label, "15 Mar");

        let courses = service.last_12_months(EntityKind::Courses).await.unwrap();
        assert_eq!(courses[11].count, 1);

        let orders = service.last_12_months(EntityKind::Orders).await.unwrap();
        assert_eq!(orders[11].count, 1);
    }

    #[tokio::test]
    async fn test_series_is_served_from_cache() {
        let (service, db) = service(300).await;
        let pool = db.pool();

        let first = service.last_12_months(EntityKind::Users).await.unwrap();
        assert_eq!(first[11].count, 0);

        // Raw insert bypasses repository invalidation
        insert_user_at(pool, "u1", secs(2024, 3, 1)).await;
        let second = service.last_12_months(EntityKind::Users).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_repository_write_invalidates_cached_series() {
        let (service, db) = service(300).await;
        let repo = db.repository();

        let first = service.last_12_months(EntityKind::Users).await.unwrap();
        assert_eq!(first.iter().map(|b| b.count).sum::<u64>(), 0);

        repo.create_user(
            Some(&service.cache),
            "Ada",
            "ada@learnhub.test",
            UserRole::User,
        )
        .await
        .unwrap();
        assert!(!service.cache.exists(&CacheKey::analytics(EntityKind::Users)).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let (service, db) = service(0).await;
        let pool = db.pool();

        service.last_12_months(EntityKind::Users).await.unwrap();
        insert_user_at(pool, "u1", secs(2024, 3, 1)).await;

        let series = service.last_12_months(EntityKind::Users).await.unwrap();
        assert_eq!(series[11].count, 1);
        assert!(!service.cache.exists(&CacheKey::analytics(EntityKind::Users)).await.unwrap());
    }

    #[tokio::test]
    async fn test_configured_timezone_shifts_labels() {
        let database = Arc::new(TransactionalService::in_memory().await);
        let config = AnalyticsConfig {
            timezone: "Pacific/Auckland".parse().unwrap(),
            cache_ttl_secs: 0,
        };
        let service = AnalyticsService::new(
            database,
            Arc::new(CacheService::in_memory(10)),
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap())),
            &config,
        );

        // 2024-03-14 12:00Z is already 2024-03-15 01:00 in Auckland
        let series = service.last_12_months(EntityKind::Orders).await.unwrap();
        assert_eq!(series[11].label, "15 Mar");
    }
}
