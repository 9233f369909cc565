//! Time-bucketed analytics
//!
//! - `calendar` - Clamped month and fixed-day arithmetic, labels
//! - `clock` - Injected source of "now"
//! - `aggregator` - Pure 12-bucket aggregation
//! - `service` - Binds entity kinds to the store, the aggregator and the cache

pub mod aggregator;
pub mod calendar;
pub mod clock;
mod service;

pub use aggregator::{
    Aggregator, BUCKET_COUNT, BUCKET_WIDTH_DAYS, PeriodBucket, Timestamped,
    aggregate_last_12_months,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use service::AnalyticsService;
