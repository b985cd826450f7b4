//! The raw entry type every feed format is converted into.
//!
//! `RawEntry` is deliberately un-normalised: fields hold exactly what the feed
//! contained (HTML included) and the date is still a string.  The
//! [`Aggregator`](crate::aggregator::Aggregator) does all cleaning, so feed
//! parsers stay thin and the cleaning rules live in one place.

/// One item as it came out of a feed.
///
/// Every field is optional because real feeds omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Headline, possibly containing markup.
    pub title: Option<String>,

    /// Summary or description body, usually HTML.
    pub summary: Option<String>,

    /// Published date string, falling back to the updated date.
    pub date: Option<String>,

    /// URL of the full article.
    pub link: Option<String>,
}

impl RawEntry {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or_default()
    }

    pub fn link(&self) -> &str {
        self.link.as_deref().unwrap_or_default()
    }
}

/// Return the first candidate that is present and not blank.
///
/// Feeds sometimes ship an empty `<description/>` next to a useful
/// `<content:encoded>`; an empty string must not shadow the fallback.
pub(crate) fn first_present<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .map(String::from)
}
