//! Calendar-day keys.
//!
//! Every history entry is addressed by a `YYYY-MM-DD` key built from the
//! local year/month/day fields of a [`NaiveDate`]. A `NaiveDate` has no time
//! of day and no zone, so the same local day always produces the same key,
//! including across DST transitions.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

use crate::error::ValidationError;

/// Format used for history keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical history key for a calendar day.
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a `YYYY-MM-DD` key back into a calendar day.
///
/// # Errors
/// Returns [`ValidationError::InvalidDateKey`] for anything that is not a
/// real calendar date in exactly that shape.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = key.trim();
    if trimmed.len() != 10 {
        return Err(ValidationError::InvalidDateKey(key.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
        .map_err(|_| ValidationError::InvalidDateKey(key.to_string()))
}

/// Calendar day of an epoch-millisecond instant as seen in `tz`.
///
/// Instants outside chrono's representable range fall back to
/// [`NaiveDate::MIN`], which places no floor on applicability.
pub fn local_day<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date.checked_sub_signed(Duration::days(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Weekday index with Sunday = 0 .. Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Inclusive day iterator from `start` to `end`. Empty when `end < start`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_key_zero_pads() {
        assert_eq!(date_key(d(2024, 1, 5)), "2024-01-05");
        assert_eq!(date_key(d(2024, 12, 31)), "2024-12-31");
    }

    #[test]
    fn test_parse_date_key_roundtrip_and_rejects() {
        assert_eq!(parse_date_key("2024-03-10").unwrap(), d(2024, 3, 10));
        assert!(parse_date_key("2024-3-10").is_err());
        assert!(parse_date_key("2024-02-30").is_err());
        assert!(parse_date_key("yesterday").is_err());
    }

    #[test]
    fn test_local_day_respects_zone() {
        // 2024-01-01T23:30:00Z
        let ms = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap().timestamp_millis();
        assert_eq!(local_day(ms, &Utc), d(2024, 1, 1));

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(local_day(ms, &plus_two), d(2024, 1, 2));

        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(local_day(ms, &minus_five), d(2024, 1, 1));
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-07 is a Sunday; its Monday-anchored week began 2024-01-01.
        assert_eq!(week_start(d(2024, 1, 7)), d(2024, 1, 1));
        assert_eq!(week_start(d(2024, 1, 1)), d(2024, 1, 1));
        assert_eq!(week_start(d(2024, 1, 3)), d(2024, 1, 1));
    }

    #[test]
    fn test_week_start_saturates_at_min() {
        assert_eq!(week_start(NaiveDate::MIN), NaiveDate::MIN);
        assert_eq!(local_day(i64::MIN, &Utc), NaiveDate::MIN);
    }

    #[test]
    fn test_weekday_index_sunday_zero() {
        assert_eq!(weekday_index(d(2024, 1, 7)), 0);
        assert_eq!(weekday_index(d(2024, 1, 6)), 6);
        assert_eq!(weekday_index(d(2024, 1, 1)), 1);
    }

    #[test]
    fn test_days_in_range_inclusive() {
        let days: Vec<_> = days_in_range(d(2024, 2, 27), d(2024, 3, 1)).collect();
        assert_eq!(days.len(), 4); // leap year: 27, 28, 29, 1
        assert_eq!(days[2], d(2024, 2, 29));
        assert_eq!(days_in_range(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
    }
}
