//! Parsing of the free-form `transactionDate` strings found in transaction data.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a transaction date into a UTC instant, returning `None` when the string is not a
/// recognizable date.
///
/// Accepts RFC 3339 (offsets are converted to UTC), naive date-times (taken as UTC) and plain dates
/// (midnight UTC). Years outside `0..=9999` are rejected so that bucket keys stay zero-padded and
/// sort chronologically.
pub fn parse_transaction_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = parse_rfc3339(s)
        .or_else(|| parse_naive_date_time(s))
        .or_else(|| {
            parse_naive_date(s)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Parsed::from)
        })?;
    let instant = match parsed {
        Parsed::Aware(dt) => dt,
        Parsed::Naive(ndt) => ndt.and_utc(),
    };
    (0..=9999).contains(&instant.year()).then_some(instant)
}

/// Parses a plain calendar date in one of the accepted date-only forms.
pub(crate) fn parse_naive_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

enum Parsed {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl From<NaiveDateTime> for Parsed {
    fn from(value: NaiveDateTime) -> Self {
        Parsed::Naive(value)
    }
}

fn parse_rfc3339(s: &str) -> Option<Parsed> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| Parsed::Aware(dt.with_timezone(&Utc)))
}

fn parse_naive_date_time(s: &str) -> Option<Parsed> {
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(Parsed::from)
}
