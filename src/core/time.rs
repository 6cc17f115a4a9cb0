//! Shared timestamp helpers for stored records.
//!
//! Stored timestamps are ISO-8601 strings in UTC with millisecond precision,
//! so lexicographic order matches chronological order.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Returns the current instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn is_valid_timestamp(value: &str) -> bool {
    parse_timestamp(value).is_some()
}

/// Instant `days` days before now.
pub fn days_ago(days: u64) -> DateTime<Utc> {
    let days = i64::try_from(days).unwrap_or(i64::MAX);
    Duration::try_days(days)
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// True when `value` parses and lies strictly after `cutoff`.
pub fn is_after(value: &str, cutoff: DateTime<Utc>) -> bool {
    parse_timestamp(value).is_some_and(|instant| instant > cutoff)
}
