//! Time utility functions

use chrono::{DateTime, Utc};

/// Current time as Unix seconds, the storage format for row timestamps
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Convert Unix seconds to DateTime<Utc>, `None` when out of chrono's range
pub fn secs_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Convert Unix seconds to DateTime<Utc>, falling back to the epoch
pub fn secs_to_datetime_lossy(secs: i64) -> DateTime<Utc> {
    secs_to_datetime(secs).unwrap_or_else(|| {
        tracing::warn!(secs, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}
