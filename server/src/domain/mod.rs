//! Domain logic
//!
//! - `analytics` - Trailing 12-month volume series over stored entities

pub mod analytics;

pub use analytics::AnalyticsService;
