//! Parsing and formatting of timeline instants

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an ISO date or timestamp
///
/// Accepts RFC 3339, naive timestamps (taken as UTC) and bare dates
/// (midnight UTC). Returns `None` for anything else.
#[must_use]
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Millisecond ISO string, e.g. `2024-02-01T00:00:00.000Z`
#[must_use]
pub fn iso_key(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC on the first day of the month after `instant`
#[must_use]
pub fn start_of_next_month(instant: &DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if instant.month() == 12 {
        (instant.year() + 1, 1)
    } else {
        (instant.year(), instant.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(*instant)
}
