//! Analytics API types

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::analytics::PeriodBucket;

/// One bucket of a 12-month series
#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodBucketDto {
    /// Bucket end date, e.g. `"15 Mar"`
    pub label: String,
    pub count: u64,
}

impl From<PeriodBucket> for PeriodBucketDto {
    fn from(bucket: PeriodBucket) -> Self {
        Self {
            label: bucket.label,
            count: bucket.count,
        }
    }
}

fn to_dtos(series: Vec<PeriodBucket>) -> Vec<PeriodBucketDto> {
    series.into_iter().map(PeriodBucketDto::from).collect()
}

/// Response for GET /analytics/users
#[derive(Debug, Serialize, ToSchema)]
pub struct UsersAnalyticsResponse {
    pub success: bool,
    pub users: Vec<PeriodBucketDto>,
}

impl UsersAnalyticsResponse {
    pub fn new(series: Vec<PeriodBucket>) -> Self {
        Self {
            success: true,
            users: to_dtos(series),
        }
    }
}

/// Response for GET /analytics/courses
#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesAnalyticsResponse {
    pub success: bool,
    pub courses: Vec<PeriodBucketDto>,
}

impl CoursesAnalyticsResponse {
    pub fn new(series: Vec<PeriodBucket>) -> Self {
        Self {
            success: true,
            courses: to_dtos(series),
        }
    }
}

/// Response for GET /analytics/orders
#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersAnalyticsResponse {
    pub success: bool,
    pub orders: Vec<PeriodBucketDto>,
}

impl OrdersAnalyticsResponse {
    pub fn new(series: Vec<PeriodBucket>) -> Self {
        Self {
            success: true,
            orders: to_dtos(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bucket_dto_drops_boundaries() {
        let bucket = PeriodBucket {
            label: "15 Mar".to_string(),
            count: 3,
            start: Utc.with_ymd_and_hms(2024, 2, 16, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(UsersAnalyticsResponse::new(vec![bucket])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "users": [{"label": "15 Mar", "count": 3}]
            })
        );
    }
}
