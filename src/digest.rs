//! The digest record produced by the aggregator.
//!
//! ## Ordering
//!
//! [`DigestItem::newest_first`] gives **reverse-chronological** ordering:
//! newer items sort before older ones and items with an unknown date sort
//! after every dated item.
//!
//! ## Fingerprint
//!
//! Two items are duplicates when they share a [`fingerprint`]: the hex SHA-256
//! of the normalised title immediately followed by the source name, with no
//! separator.  The concatenation order is part of the format; changing it
//! changes every fingerprint.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Rendered in place of a date that could not be parsed.
pub const UNKNOWN_DATE: &str = "unknown";

/// A digest timestamp, or the explicit "unknown" sentinel.
///
/// `Unknown` compares less than every `Known` value, so a descending sort
/// puts undated items last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemDate {
    Unknown,
    Known(DateTime<Utc>),
}

impl From<Option<DateTime<Utc>>> for ItemDate {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for ItemDate {
    /// ISO-8601 with a `+00:00` offset; fractional seconds only when present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Unknown => f.write_str(UNKNOWN_DATE),
        }
    }
}

/// One entry of the final digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    /// Normalised headline; never empty.
    pub title: String,
    /// Normalised, length-bounded synopsis.
    pub summary: String,
    pub date: ItemDate,
    /// Display name of the feed the item came from.
    pub source: String,
    /// Article URL, possibly empty.
    pub link: String,
    /// Catalog category the source is listed under.
    pub category: String,
}

/// Deduplication key for a (title, source) pair.
pub fn fingerprint(title: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

impl DigestItem {
    /// Comparator for a newest-first sort; undated items go last.
    ///
    /// A plain function rather than `Ord`: two items with the same date are
    /// equally placed without being equal.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
