//! Time utilities for report periods
//!
//! Nothing here reads the wall clock: callers pass "now" in so period
//! boundaries stay deterministic under test.

use crate::types::ReportPeriod;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};

/// Seconds from midnight to the last second of a day (23:59:59)
const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Timestamp layout expected by the provider API (ISO 8601 with numeric offset)
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Compute the previous calendar month relative to `now`
///
/// Start is the first day at 00:00:00 and end the last day at 23:59:59,
/// both in `now`'s time zone.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use smtp2go_usage::utils::time::previous_month_range;
///
/// let period = previous_month_range(&Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap());
/// assert_eq!(period.start.format("%Y-%m-%d").to_string(), "2025-02-01");
/// assert_eq!(period.end.format("%Y-%m-%d").to_string(), "2025-02-28");
/// ```
pub fn previous_month_range<Tz: TimeZone>(now: &DateTime<Tz>) -> ReportPeriod {
    let today = now.date_naive();
    let first_of_current = today - Duration::days(today.day0() as i64);
    let last_of_previous = first_of_current - Duration::days(1);
    let first_of_previous = last_of_previous - Duration::days(last_of_previous.day0() as i64);

    let tz = now.timezone();
    let fallback = now.offset().fix();
    ReportPeriod::new(
        localize(&tz, start_of_day(first_of_previous), fallback),
        localize(&tz, end_of_day(last_of_previous), fallback),
    )
}

/// Build an inclusive period covering whole days from `start` through `end`
pub fn period_for_dates<Tz: TimeZone>(start: NaiveDate, end: NaiveDate, tz: &Tz) -> ReportPeriod {
    let fallback = tz
        .offset_from_utc_datetime(&start_of_day(start))
        .fix();
    ReportPeriod::new(
        localize(tz, start_of_day(start), fallback),
        localize(tz, end_of_day(end), fallback),
    )
}

/// Render a timestamp the way the provider API expects it
///
/// # Examples
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use smtp2go_usage::utils::time::format_api_timestamp;
///
/// let tz = FixedOffset::east_opt(10 * 3600).unwrap();
/// let dt = tz.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
/// assert_eq!(format_api_timestamp(&dt), "2025-02-01T00:00:00+1000");
/// ```
pub fn format_api_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format(API_TIMESTAMP_FORMAT).to_string()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(LAST_SECOND_OF_DAY)
}

/// Attach a zone to a wall-clock time, resolving DST ambiguity to the
/// earlier instant. Wall-clock times skipped by a DST gap keep `fallback`.
fn localize<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    fallback: FixedOffset,
) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&dt.offset().fix()),
        None => DateTime::from_naive_utc_and_offset(
            naive - Duration::seconds(fallback.local_minus_utc() as i64),
            fallback,
        ),
    }
}
