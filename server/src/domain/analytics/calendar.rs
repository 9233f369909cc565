//! Calendar arithmetic for analytics bucket boundaries
//!
//! All functions are pure and never read the wall clock. Arithmetic is done
//! on the local (wall-clock) date of the given time zone and the result is
//! mapped back to an instant:
//!
//! - Month subtraction clamps the day-of-month to the length of the target
//!   month (`Mar 31 - 1 month = Feb 29` in a leap year, `Feb 28` otherwise).
//! - A local time that falls into a DST gap resolves to the first valid
//!   instant after it. An ambiguous local time keeps the source offset when
//!   it can, and otherwise resolves to the earlier instant.
//! - Subtracting zero returns the input unchanged.
//! - Results outside chrono's representable range saturate to
//!   `DateTime::<Utc>::MIN_UTC`.

use chrono::{
    DateTime, Days, Duration, LocalResult, Months, NaiveDateTime, Offset, TimeZone, Utc,
};

/// Label format for bucket ends: zero-padded day and abbreviated month
pub const LABEL_FORMAT: &str = "%d %b";

/// Subtract whole calendar months, keeping the local time of day.
pub fn sub_months<Tz: TimeZone>(dt: &DateTime<Tz>, months: u32) -> DateTime<Tz> {
    if months == 0 {
        return dt.clone();
    }
    dt.naive_local()
        .checked_sub_months(Months::new(months))
        .and_then(|naive| resolve_local(dt, naive))
        .unwrap_or_else(|| saturate(dt, "sub_months", months as u64))
}

/// Subtract whole calendar days, keeping the local time of day.
pub fn sub_days<Tz: TimeZone>(dt: &DateTime<Tz>, days: u64) -> DateTime<Tz> {
    if days == 0 {
        return dt.clone();
    }
    dt.naive_local()
        .checked_sub_days(Days::new(days))
        .and_then(|naive| resolve_local(dt, naive))
        .unwrap_or_else(|| saturate(dt, "sub_days", days))
}

/// Bucket label for a boundary instant, e.g. `"15 Mar"`
pub fn format_label<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(LABEL_FORMAT).to_string()
}

/// Map a local wall-clock time back to an instant in `from`'s zone.
///
/// An ambiguous time keeps `from`'s offset when either candidate has it.
fn resolve_local<Tz: TimeZone>(from: &DateTime<Tz>, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    let tz = from.timezone();
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, second) => {
            if second.offset().fix() == from.offset().fix() {
                Some(second)
            } else {
                Some(first)
            }
        }
        // DST gaps are at most an hour in every zone chrono-tz ships
        LocalResult::None => naive
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest()),
    }
}

fn saturate<Tz: TimeZone>(dt: &DateTime<Tz>, op: &'static str, amount: u64) -> DateTime<Tz> {
    tracing::warn!(
        op,
        amount,
        instant = %dt.naive_utc(),
        "Calendar arithmetic out of range, saturating"
    );
    DateTime::<Utc>::MIN_UTC.with_timezone(&dt.timezone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use chrono_tz::America::New_York;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_sub_months_clamps_to_leap_february() {
        let dt = sub_months(&utc(2024, 3, 31, 10, 0), 1);
        assert_eq!(dt, utc(2024, 2, 29, 10, 0));
    }

    #[test]
    fn test_sub_months_clamps_to_common_february() {
        let dt = sub_months(&utc(2023, 3, 31, 10, 0), 1);
        assert_eq!(dt, utc(2023, 2, 28, 10, 0));
    }

    #[test]
    fn test_sub_months_clamps_thirty_day_month() {
        let dt = sub_months(&utc(2024, 5, 31, 0, 0), 1);
        assert_eq!(dt, utc(2024, 4, 30, 0, 0));
    }

    #[test]
    fn test_sub_months_crosses_year_boundary() {
        assert_eq!(sub_months(&utc(2024, 1, 15, 8, 30), 1), utc(2023, 12, 15, 8, 30));
        assert_eq!(sub_months(&utc(2024, 2, 10, 0, 0), 14), utc(2022, 12, 10, 0, 0));
    }

    #[test]
    fn test_sub_months_full_year() {
        assert_eq!(sub_months(&utc(2024, 3, 15, 0, 0), 12), utc(2023, 3, 15, 0, 0));
        // Leap day a year back has no counterpart
        assert_eq!(sub_months(&utc(2024, 2, 29, 0, 0), 12), utc(2023, 2, 28, 0, 0));
    }

    #[test]
    fn test_sub_months_zero_is_identity() {
        let dt = utc(2024, 7, 4, 12, 34);
        assert_eq!(sub_months(&dt, 0), dt);
    }

    #[test]
    fn test_sub_months_does_not_chain_clamping() {
        // Each subtraction starts from the original day, so the clamp from
        // February does not leak into January.
        let now = utc(2024, 3, 31, 0, 0);
        assert_eq!(sub_months(&now, 2), utc(2024, 1, 31, 0, 0));
    }

    #[test]
    fn test_sub_months_dst_gap_moves_forward() {
        // 2024-03-10 02:30 does not exist in New York (clocks jump 02:00 -> 03:00)
        let now = New_York.with_ymd_and_hms(2024, 4, 10, 2, 30, 0).unwrap();
        let dt = sub_months(&now, 1);
        assert_eq!(dt.day(), 10);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_sub_months_keeps_local_time_across_dst() {
        // EDT -> EST: the wall clock stays at 09:00 but the UTC hour shifts
        let now = New_York.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        let dt = sub_months(&now, 6);
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.with_timezone(&Utc).hour(), 14);
        assert_eq!(now.with_timezone(&Utc).hour(), 13);
    }

    #[test]
    fn test_sub_months_saturates() {
        let dt = sub_months(&DateTime::<Utc>::MIN_UTC, 1);
        assert_eq!(dt, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_sub_months_zero_keeps_second_repeated_hour() {
        // 06:30 UTC on 2024-11-03 is the second 01:30 in New York (EST)
        let now = utc(2024, 11, 3, 6, 30).with_timezone(&New_York);
        assert_eq!(sub_months(&now, 0), now);
        assert_eq!(sub_days(&now, 0), now);
    }

    #[test]
    fn test_ambiguous_time_keeps_source_offset() {
        // 2024-12-03 01:30 EST minus 30 days lands on the repeated hour
        // and keeps EST
        let from = New_York.with_ymd_and_hms(2024, 12, 3, 1, 30, 0).unwrap();
        let dt = sub_days(&from, 30);
        assert_eq!(dt.with_timezone(&Utc), utc(2024, 11, 3, 6, 30));

        // From the first (EDT) 01:30 of 2025-11-02 the EDT copy is chosen
        let from = utc(2025, 11, 2, 5, 30).with_timezone(&New_York);
        let dt = sub_days(&from, 364);
        assert_eq!(dt.with_timezone(&Utc), utc(2024, 11, 3, 5, 30));
    }

    #[test]
    fn test_sub_days_across_leap_february() {
        assert_eq!(sub_days(&utc(2024, 3, 15, 0, 0), 28), utc(2024, 2, 16, 0, 0));
        assert_eq!(sub_days(&utc(2023, 3, 15, 0, 0), 28), utc(2023, 2, 15, 0, 0));
    }

    #[test]
    fn test_sub_days_saturates() {
        let dt = sub_days(&DateTime::<Utc>::MIN_UTC, 1);
        assert_eq!(dt, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(&utc(2024, 3, 5, 23, 59)), "05 Mar");
        assert_eq!(format_label(&utc(2023, 12, 31, 0, 0)), "31 Dec");
    }

    #[test]
    fn test_format_label_uses_local_date() {
        // 03:00 UTC on the 1st is still the previous day in New York
        let dt = utc(2024, 3, 1, 3, 0).with_timezone(&New_York);
        assert_eq!(format_label(&dt), "29 Feb");
    }
}
