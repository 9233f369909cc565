//! Trailing 12-month volume aggregation
//!
//! Bucket `i` (0 = most recent) ends `i` calendar months before the
//! aggregation instant and is exactly 28 calendar days wide:
//!
//! ```text
//! end_i   = now - i months   (day clamped to month length)
//! start_i = end_i - 28 days
//! bucket  = [start_i, end_i)
//! ```
//!
//! The fixed width means adjacent buckets only touch when their ends are
//! 28 days apart; otherwise records in the gap are not counted. Buckets
//! never overlap, so a record is counted at most once.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::calendar::{format_label, sub_days, sub_months};

/// Number of buckets in a series
pub const BUCKET_COUNT: usize = 12;

/// Width of every bucket in calendar days
pub const BUCKET_WIDTH_DAYS: u64 = 28;

/// A record that can be placed on the analytics timeline
pub trait Timestamped {
    /// Creation instant, or `None` when the record has no usable timestamp
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for DateTime<Utc> {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl<T: Timestamped> Timestamped for Option<T> {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(Timestamped::created_at)
    }
}

/// One point of the series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// Bucket end formatted as `"DD Mon"` in the aggregation time zone
    pub label: String,
    pub count: u64,
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl PeriodBucket {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Aggregates timestamped records into a trailing 12-bucket series.
///
/// Calendar arithmetic and labels use the configured time zone.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    tz: Tz,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

impl Aggregator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Empty buckets for `now`, oldest first
    pub fn buckets(&self, now: DateTime<Utc>) -> Vec<PeriodBucket> {
        let local_now = now.with_timezone(&self.tz);

        (0..BUCKET_COUNT as u32)
            .rev()
            .map(|i| {
                let end = sub_months(&local_now, i);
                let start = sub_days(&end, BUCKET_WIDTH_DAYS);
                PeriodBucket {
                    label: format_label(&end),
                    count: 0,
                    start: start.with_timezone(&Utc),
                    end: end.with_timezone(&Utc),
                }
            })
            .collect()
    }

    /// Count `records` into the 12 buckets ending at `now`.
    ///
    /// Input order does not matter. Records outside every bucket, and records
    /// without a timestamp, are ignored.
    pub fn aggregate<'a, R, I>(&self, records: I, now: DateTime<Utc>) -> Vec<PeriodBucket>
    where
        I: IntoIterator<Item = &'a R>,
        R: Timestamped + 'a,
    {
        let mut buckets = self.buckets(now);
        let mut untimed = 0usize;

        for record in records {
            let Some(t) = record.created_at() else {
                untimed += 1;
                continue;
            };
            // Buckets never overlap, so the first match is the only one
            if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(t)) {
                bucket.count += 1;
            }
        }

        if untimed > 0 {
            tracing::trace!(untimed, "Skipped records without timestamp");
        }

        buckets
    }
}

/// Aggregate in UTC. See [`Aggregator::aggregate`].
pub fn aggregate_last_12_months<'a, R, I>(records: I, now: DateTime<Utc>) -> Vec<PeriodBucket>
where
    I: IntoIterator<Item = &'a R>,
    R: Timestamped + 'a,
{
    Aggregator::default().aggregate(records, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::Berlin;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn total(buckets: &[PeriodBucket]) -> u64 {
        buckets.iter().map(|b| b.count).sum()
    }

    /// One record at noon for every day in `[from, to)`
    fn daily_noon(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut out = Vec::new();
        let mut t = from + Duration::hours(12);
        while t < to {
            out.push(t);
            t += Duration::days(1);
        }
        out
    }

    #[test]
    fn test_always_twelve_buckets() {
        let empty: Vec<DateTime<Utc>> = Vec::new();
        assert_eq!(aggregate_last_12_months(&empty, utc(2024, 3, 15)).len(), 12);

        let many = daily_noon(utc(2020, 1, 1), utc(2025, 1, 1));
        assert_eq!(aggregate_last_12_months(&many, utc(2024, 3, 15)).len(), 12);
    }

    #[test]
    fn test_empty_input_gives_zero_counts() {
        let empty: Vec<DateTime<Utc>> = Vec::new();
        let buckets = aggregate_last_12_months(&empty, utc(2024, 3, 15));
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_newest_bucket_ends_at_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 41, 7).unwrap();
        let buckets = Aggregator::default().buckets(now);
        let newest = buckets.last().unwrap();
        assert_eq!(newest.end, now);
        assert_eq!(newest.start, now - Duration::days(28));
        assert_eq!(newest.label, "15 Mar");
    }

    #[test]
    fn test_oldest_bucket_is_eleven_months_back() {
        let buckets = Aggregator::default().buckets(utc(2024, 3, 15));
        let oldest = &buckets[0];
        assert_eq!(oldest.end, utc(2023, 4, 15));
        assert_eq!(oldest.start, utc(2023, 3, 18));
        assert_eq!(oldest.label, "15 Apr");
    }

    #[test]
    fn test_labels_follow_month_ends() {
        let buckets = Aggregator::default().buckets(utc(2024, 3, 31));
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "30 Apr", "31 May", "30 Jun", "31 Jul", "31 Aug", "30 Sep", "31 Oct", "30 Nov",
                "31 Dec", "31 Jan", "29 Feb", "31 Mar",
            ]
        );
    }

    #[test]
    fn test_ends_strictly_increase() {
        for now in [utc(2024, 3, 15), utc(2024, 3, 31), utc(2023, 1, 1), utc(2024, 12, 31)] {
            let buckets = Aggregator::default().buckets(now);
            for pair in buckets.windows(2) {
                assert!(pair[0].end < pair[1].end, "{:?}", now);
            }
        }
    }

    #[test]
    fn test_buckets_never_overlap() {
        for now in [utc(2024, 3, 15), utc(2024, 3, 31), utc(2023, 3, 29), utc(2025, 1, 31)] {
            let buckets = Aggregator::default().buckets(now);
            for pair in buckets.windows(2) {
                assert!(pair[0].end <= pair[1].start, "{:?}", now);
            }
        }
    }

    #[test]
    fn test_buckets_touch_across_common_february() {
        // Feb 15 -> Mar 15 in a common year is exactly 28 days
        let buckets = Aggregator::default().buckets(utc(2023, 3, 15));
        let (prev, newest) = (&buckets[10], &buckets[11]);
        assert_eq!(prev.end, utc(2023, 2, 15));
        assert_eq!(newest.start, utc(2023, 2, 15));
    }

    #[test]
    fn test_gap_across_longer_month() {
        // Jan 15 -> Feb 15 is 31 days, leaving a 3-day gap
        let buckets = Aggregator::default().buckets(utc(2023, 3, 15));
        assert_eq!(buckets[10].start - buckets[9].end, Duration::days(3));

        let in_gap = vec![utc(2023, 1, 16)];
        assert_eq!(total(&aggregate_last_12_months(&in_gap, utc(2023, 3, 15))), 0);
    }

    #[test]
    fn test_each_bucket_counts_twenty_eight_days() {
        let records = daily_noon(utc(2022, 1, 1), utc(2024, 6, 1));
        let buckets = aggregate_last_12_months(&records, utc(2024, 3, 15));
        assert!(buckets.iter().all(|b| b.count == 28));
        assert_eq!(total(&buckets), 12 * 28);
    }

    #[test]
    fn test_conservation_over_window() {
        let now = utc(2024, 3, 31);
        let records = daily_noon(utc(2022, 6, 1), utc(2024, 6, 1));
        let buckets = aggregate_last_12_months(&records, now);

        let expected = records
            .iter()
            .filter(|t| buckets.iter().any(|b| b.contains(**t)))
            .count() as u64;
        assert_eq!(total(&buckets), expected);

        // Nothing before the oldest start or at/after now is counted
        let outside: Vec<DateTime<Utc>> = records
            .iter()
            .copied()
            .filter(|t| *t < buckets[0].start || *t >= now)
            .collect();
        assert!(!outside.is_empty());
        assert_eq!(total(&aggregate_last_12_months(&outside, now)), 0);
    }

    #[test]
    fn test_record_at_now_is_excluded() {
        let now = utc(2024, 3, 15);
        let records = vec![now];
        assert_eq!(total(&aggregate_last_12_months(&records, now)), 0);
    }

    #[test]
    fn test_record_at_start_is_included() {
        let now = utc(2024, 3, 15);
        let records = vec![utc(2024, 2, 16)];
        let buckets = aggregate_last_12_months(&records, now);
        assert_eq!(buckets[11].count, 1);
        assert_eq!(total(&buckets), 1);
    }

    #[test]
    fn test_seam_record_goes_to_newer_bucket() {
        let now = utc(2023, 3, 15);
        let seam = utc(2023, 2, 15);
        let records = vec![seam];
        let buckets = aggregate_last_12_months(&records, now);
        assert_eq!(buckets[10].count, 0);
        assert_eq!(buckets[11].count, 1);
    }

    #[test]
    fn test_concrete_scenario() {
        let now = utc(2024, 3, 15);
        let records = vec![utc(2024, 3, 10), utc(2024, 3, 16), utc(2023, 3, 1)];
        let buckets = aggregate_last_12_months(&records, now);

        assert_eq!(buckets.len(), 12);
        let newest = &buckets[11];
        assert_eq!(newest.end, now);
        assert_eq!(newest.count, 1);
        assert_eq!(total(&buckets), 1);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let now = utc(2024, 3, 15);
        let mut records = daily_noon(utc(2023, 1, 1), utc(2024, 4, 1));
        let forward = aggregate_last_12_months(&records, now);
        records.reverse();
        let backward = aggregate_last_12_months(&records, now);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_deterministic_output() {
        let now = utc(2024, 3, 15);
        let records = daily_noon(utc(2023, 1, 1), utc(2024, 4, 1));
        let a = serde_json::to_string(&aggregate_last_12_months(&records, now)).unwrap();
        let b = serde_json::to_string(&aggregate_last_12_months(&records, now)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_untimed_records_are_skipped() {
        let now = utc(2024, 3, 15);
        let records = vec![Some(utc(2024, 3, 1)), None, Some(utc(2024, 3, 2))];
        let buckets = aggregate_last_12_months(&records, now);
        assert_eq!(total(&buckets), 2);
    }

    #[test]
    fn test_timezone_shifts_labels_and_boundaries() {
        // 23:30 UTC on Mar 15 is already Mar 16 in Berlin
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();

        let utc_buckets = Aggregator::default().buckets(now);
        let berlin_buckets = Aggregator::new(Berlin).buckets(now);

        assert_eq!(utc_buckets[11].label, "15 Mar");
        assert_eq!(berlin_buckets[11].label, "16 Mar");
        assert_eq!(berlin_buckets[11].end, now);

        // Berlin switches to summer time on Mar 31, so the April boundary
        // sits an hour earlier in UTC than the wall clock suggests.
        let april = &berlin_buckets[0];
        assert_eq!(april.label, "16 Apr");
        assert_eq!(
            april.end,
            Utc.with_ymd_and_hms(2023, 4, 15, 22, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_newest_bucket_ends_at_now_in_repeated_hour() {
        // 06:30 UTC on 2024-11-03 is the second 01:30 in New York
        let now = Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap();
        let aggregator = Aggregator::new(New_York);

        let buckets = aggregator.buckets(now);
        assert_eq!(buckets[11].end, now);
        assert_eq!(buckets[11].label, "03 Nov");

        let records = vec![now - Duration::minutes(30)];
        let buckets = aggregator.aggregate(&records, now);
        assert_eq!(buckets[11].count, 1);
    }
}
