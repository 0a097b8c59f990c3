//! Parsing of date `search_after` cursors.
//!
//! Clients page through date-sorted results by echoing back the sort value
//! of the last hit they saw, usually as an ISO 8601 date of whatever
//! precision they have at hand. Missing components default to their minimum
//! (`2018` is midnight on 2018-01-01 UTC), and a bare number is taken to be
//! epoch milliseconds already.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"];

/// Converts a cursor string to epoch milliseconds.
///
/// Returns `None` for anything that is neither a (partial) date nor a finite
/// number. Never panics.
///
/// ```
/// use marginalia_search::query::parse_date_cursor;
///
/// assert_eq!(parse_date_cursor("2018"), Some(1514764800000.0));
/// assert_eq!(parse_date_cursor("2018-01-01T00:00:00Z"), Some(1514764800000.0));
/// assert_eq!(parse_date_cursor("1514764800000"), Some(1514764800000.0));
/// assert_eq!(parse_date_cursor("tomorrow"), None);
/// ```
pub fn parse_date_cursor(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    parse_datetime(value)
        .map(|dt| dt.timestamp_millis() as f64)
        .or_else(|| parse_epoch_millis(value))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }

    parse_partial_date(value).and_then(|date| date.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
fn parse_partial_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = value.splitn(3, '-');
    let year = parse_component(parts.next()?, 4)?;
    let month = match parts.next() {
        Some(month) => parse_component(month, 2)?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)
}

fn parse_component(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn parse_epoch_millis(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN_1_2018: f64 = 1514764800000.0;

    #[test]
    fn test_partial_dates_default_to_minimum() {
        assert_eq!(parse_date_cursor("2018"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01-01"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01-01T00:00"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-02"), Some(1517443200000.0));
    }

    #[test]
    fn test_full_timestamps() {
        assert_eq!(parse_date_cursor("2018-01-01T00:00:00.000Z"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01-01T01:00:00+01:00"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01-01T01:00:00+0100"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor("2018-01-01 00:00:01"), Some(JAN_1_2018 + 1000.0));
    }

    #[test]
    fn test_numbers_are_epoch_millis() {
        assert_eq!(parse_date_cursor("1514764800000"), Some(JAN_1_2018));
        assert_eq!(parse_date_cursor(" 42.5 "), Some(42.5));
    }

    #[test]
    fn test_garbage_is_rejected() {
        for bad in ["", "   ", "foo", "2018-13", "2018-02-30", "NaN", "inf", "2018-01-01-01"] {
            assert_eq!(parse_date_cursor(bad), None, "input {bad:?}");
        }
    }
}
