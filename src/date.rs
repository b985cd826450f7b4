//! Lenient date parsing for feed timestamps.
//!
//! Feeds in the wild use RFC 2822 (`Mon, 01 Jan 2024 00:00:00 +0000`),
//! RFC 3339 (`2024-01-01T00:00:00Z`) and a long tail of ad-hoc variants.
//! [`parse`] tries the strict formats first and then a list of loose
//! patterns.  Values with an explicit offset are converted to UTC; values
//! without one are taken to already be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Patterns carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M %z",
    "%a %b %d %H:%M:%S %z %Y",
];

/// Patterns without zone information; interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%a %b %d %H:%M:%S %Y",
];

/// Date-only patterns; midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a, %d %b %Y",
];

/// Zone names that mean UTC but that the offset patterns don't understand.
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", " UT", "Z", " Z"];

/// Parse a feed date string into a UTC timestamp.
///
/// Returns `None` for empty or unrecognised input; a bad date is never an
/// error.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_strict(s)
        .or_else(|| parse_with_offset(s))
        .or_else(|| parse_naive(s))
        .or_else(|| strip_utc_suffix(s).and_then(parse_naive))
        .or_else(|| strip_weekday(s).and_then(parse))
}

fn parse_strict(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn strip_utc_suffix(s: &str) -> Option<&str> {
    UTC_SUFFIXES
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .map(str::trim_end)
}

// RFC 2822 parsing rejects a weekday that doesn't match the date, which some
// feeds get wrong.  The weekday carries no information, so drop it and retry.
fn strip_weekday(s: &str) -> Option<&str> {
    let (head, rest) = s.split_once(',')?;
    if head.len() == 3 && head.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(rest.trim_start())
    } else {
        None
    }
}
