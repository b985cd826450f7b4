//! The aggregation pipeline.
//!
//! For every source in the catalog, in order: fetch, normalise, drop stale
//! entries, deduplicate, summarise.  Then sort newest-first and cut to the
//! requested size.
//!
//! Nothing in here fails.  A feed that can't be fetched contributes zero
//! entries; an entry whose date can't be parsed is kept with an unknown date;
//! a summariser that can't reach its service falls back to the naive one.  An
//! empty result is a valid answer meaning "nothing found".

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::{Category, FeedCatalog, FeedSource, RunParams};
use crate::digest::{fingerprint, DigestItem, ItemDate};
use crate::source::{FeedFetcher, RawEntry};
use crate::summarize::{self, NaiveSummarizer, Summarizer};
use crate::{date, text};

/// Runs the pipeline over a catalog with a given fetcher.
pub struct Aggregator<'a, F> {
    catalog: &'a FeedCatalog,
    fetcher: F,
    naive: NaiveSummarizer,
    /// Used when a run asks for external summaries; built from the
    /// environment on demand when unset.
    external: Option<Box<dyn Summarizer + 'a>>,
}

impl<'a, F: FeedFetcher> Aggregator<'a, F> {
    pub fn new(catalog: &'a FeedCatalog, fetcher: F) -> Self {
        Self {
            catalog,
            fetcher,
            naive: NaiveSummarizer::default(),
            external: None,
        }
    }

    /// Use `summarizer` for runs with `use_external_summarizer` set.
    pub fn with_external_summarizer(mut self, summarizer: Box<dyn Summarizer + 'a>) -> Self {
        self.external = Some(summarizer);
        self
    }

    /// Build the digest relative to the current time.
    pub fn aggregate(&self, params: &RunParams) -> Vec<DigestItem> {
        self.aggregate_at(Utc::now(), params)
    }

    /// Build the digest relative to `now`.
    pub fn aggregate_at(&self, now: DateTime<Utc>, params: &RunParams) -> Vec<DigestItem> {
        let cutoff = cutoff(now, params.days);

        let from_env;
        let summarizer: &dyn Summarizer = match (&self.external, params.use_external_summarizer) {
            (_, false) => &self.naive,
            (Some(external), true) => &**external,
            (None, true) => {
                from_env = summarize::external_from_env();
                &*from_env
            }
        };

        let mut run = Run {
            cutoff,
            summarizer,
            seen: HashSet::new(),
            items: Vec::new(),
            duplicates: 0,
        };

        for category in &self.catalog.categories {
            for source in &category.sources {
                let entries = match self.fetcher.fetch(&source.url) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(source = %source.name, url = %source.url, "skipping feed: {e:#}");
                        continue;
                    }
                };
                debug!(source = %source.name, entries = entries.len(), "fetched feed");

                for entry in entries {
                    run.admit(entry, source, category);
                }
            }
        }

        let Run {
            mut items,
            duplicates,
            ..
        } = run;

        info!(unique = items.len(), duplicates, "collected entries");

        // Stable: equal dates keep first-seen order.
        items.sort_by(DigestItem::newest_first);
        items.truncate(params.limit);
        items
    }
}

/// Earliest timestamp an entry may carry and still be recent.
fn cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Mutable state of a single aggregation call.
struct Run<'s> {
    cutoff: DateTime<Utc>,
    summarizer: &'s dyn Summarizer,
    seen: HashSet<String>,
    items: Vec<DigestItem>,
    duplicates: usize,
}

impl Run<'_> {
    fn admit(&mut self, entry: RawEntry, source: &FeedSource, category: &Category) {
        let title = text::normalize(entry.title());
        if title.is_empty() {
            debug!(source = %source.name, "skipping entry without title");
            return;
        }

        let parsed = date::parse(entry.date());
        if let Some(published) = parsed {
            if published < self.cutoff {
                debug!(%title, %published, "skipping stale entry");
                return;
            }
        }

        // The fingerprint only depends on title and source, so duplicates are
        // rejected before paying for a summary.
        if !self.seen.insert(fingerprint(&title, &source.name)) {
            debug!(%title, source = %source.name, "skipping duplicate");
            self.duplicates += 1;
            return;
        }

        let description = text::normalize(entry.summary());
        let summary = self.summarizer.summarize(&description);

        self.items.push(DigestItem {
            title,
            summary,
            date: ItemDate::from(parsed),
            source: source.name.clone(),
            link: entry.link().to_string(),
            category: category.label.clone(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    use anyhow::{anyhow, Result};
    use chrono::{SecondsFormat, TimeZone};

    use crate::summarize::external::{ChatBackend, ChatError, ExternalSummarizer};

    /// Serves canned entries per URL; unknown URLs fail like a dead host.
    #[derive(Default)]
    struct FixtureFetcher {
        feeds: HashMap<String, Vec<RawEntry>>,
        calls: Cell<usize>,
    }

    impl FixtureFetcher {
        fn with(mut self, url: &str, entries: Vec<RawEntry>) -> Self {
            self.feeds.insert(url.to_string(), entries);
            self
        }
    }

    impl FeedFetcher for FixtureFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
            self.calls.set(self.calls.get() + 1);
            self.feeds
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused: {url}"))
        }
    }

    struct FailingBackend;

    impl ChatBackend for FailingBackend {
        fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
            Err(ChatError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    struct UpperBackend;

    impl ChatBackend for UpperBackend {
        fn complete(&self, _system: &str, user: &str) -> Result<String, ChatError> {
            Ok(user.to_uppercase())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> String {
        (now() - Duration::days(days)).to_rfc2822()
    }

    fn entry(title: &str, summary: &str, date: Option<String>) -> RawEntry {
        RawEntry {
            title: Some(title.to_string()),
            summary: Some(summary.to_string()),
            date,
            link: Some(format!("https://example.com/{}", title.replace(' ', "-"))),
        }
    }

    fn catalog(sources: &[(&str, &str, &str)]) -> FeedCatalog {
        let mut categories: Vec<Category> = Vec::new();
        for &(label, name, url) in sources {
            let source = FeedSource::new(name, url);
            match categories.iter_mut().find(|c| c.label == label) {
                Some(c) => c.sources.push(source),
                None => categories.push(Category::new(label, vec![source])),
            }
        }
        FeedCatalog::new(categories)
    }

    fn params(days: u32, limit: usize) -> RunParams {
        RunParams {
            days,
            limit,
            use_external_summarizer: false,
        }
    }

    fn titles(items: &[DigestItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    // -- end-to-end scenarios --------------------------------------------------

    #[test]
    fn single_recent_entry_is_summarised() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![entry(
                "Title A",
                "Sentence one. Sentence two. Sentence three.",
                Some(days_ago(1)),
            )],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Title A");
        assert_eq!(item.summary, "Sentence one. Sentence two.");
        assert_eq!(item.source, "Feed");
        assert_eq!(item.category, "Tech");
        assert_eq!(item.link, "https://example.com/Title-A");
        let ItemDate::Known(date) = item.date else {
            panic!("date should be known");
        };
        assert!(date >= now() - Duration::days(7) && date <= now());
    }

    #[test]
    fn entry_older_than_window_is_excluded() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("Old news", "x.", Some(days_ago(10)))]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        assert!(items.is_empty());
    }

    #[test]
    fn same_title_and_source_across_feeds_is_kept_once() {
        let catalog = catalog(&[("World", "Wire", "u1"), ("Tech", "Wire", "u2")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("Breaking News", "First copy.", Some(days_ago(2)))])
            .with("u2", vec![entry("Breaking News", "Second copy.", Some(days_ago(1)))]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].summary, "First copy.", "first seen wins");
        assert_eq!(items[0].category, "World");
    }

    #[test]
    fn limit_keeps_most_recent() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![
                entry("three", "", Some(days_ago(3))),
                entry("one", "", Some(days_ago(1))),
                entry("five", "", Some(days_ago(5))),
                entry("two", "", Some(days_ago(2))),
                entry("four", "", Some(days_ago(4))),
            ],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 2));
        assert_eq!(titles(&items), ["one", "two"]);
    }

    #[test]
    fn failing_external_service_yields_naive_summaries() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let descriptions = [
            "Alpha one. Alpha two. Alpha three.",
            "Beta only",
            "Gamma! Gamma? Gamma.",
        ];
        let entries = descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| entry(&format!("t{i}"), d, Some(days_ago(i as i64 + 1))))
            .collect();
        let fetcher = FixtureFetcher::default().with("u1", entries);

        let aggregator = Aggregator::new(&catalog, fetcher)
            .with_external_summarizer(Box::new(ExternalSummarizer::new(FailingBackend)));
        let run = RunParams {
            use_external_summarizer: true,
            ..params(7, 7)
        };
        let items = aggregator.aggregate_at(now(), &run);

        let naive = NaiveSummarizer::default();
        assert_eq!(items.len(), 3);
        for (item, description) in items.iter().zip(descriptions) {
            assert_eq!(item.summary, naive.summarize(description));
        }
    }

    // -- recency ---------------------------------------------------------------

    #[test]
    fn unparsable_date_is_never_filtered_and_sorts_last() {
        // Undated entries bypass the recency window regardless of true age.
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![
                entry("garbled", "", Some("sometime last year".into())),
                entry("missing", "", None),
                entry("dated", "", Some(days_ago(6))),
            ],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));

        assert_eq!(titles(&items), ["dated", "garbled", "missing"]);
        assert_eq!(items[1].date, ItemDate::Unknown);
        assert_eq!(items[1].date.to_string(), "unknown");
        assert_eq!(items[2].date, ItemDate::Unknown);
    }

    #[test]
    fn entry_exactly_at_cutoff_is_kept() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let at_cutoff = (now() - Duration::days(7)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![
                entry("edge", "", Some(at_cutoff)),
                entry(
                    "just past",
                    "",
                    Some((now() - Duration::days(7) - Duration::seconds(1)).to_rfc3339()),
                ),
            ],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        assert_eq!(titles(&items), ["edge"]);
    }

    #[test]
    fn zero_days_keeps_only_future_or_now() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![
                entry("now", "", Some(now().to_rfc3339())),
                entry("hour ago", "", Some((now() - Duration::hours(1)).to_rfc3339())),
            ],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(0, 7));
        assert_eq!(titles(&items), ["now"]);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("ancient", "", Some("1970-01-01T00:00:00Z".into()))]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(u32::MAX, 7));
        assert_eq!(titles(&items), ["ancient"]);
    }

    // -- normalisation and dedup -----------------------------------------------

    #[test]
    fn titles_and_descriptions_are_normalised() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![entry(
                "<b>Big</b>\n   launch",
                "<p>First   line.</p>\n<p>Second line.</p><p>Third.</p>",
                Some(days_ago(1)),
            )],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        assert_eq!(items[0].title, "Big launch");
        assert_eq!(items[0].summary, "First line. Second line.");
    }

    #[test]
    fn empty_titles_are_skipped() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let mut untitled = entry("x", "body.", Some(days_ago(1)));
        untitled.title = None;
        let fetcher = FixtureFetcher::default().with(
            "u1",
            vec![
                untitled,
                entry("   ", "body.", Some(days_ago(1))),
                entry("<img src=\"a.png\">", "body.", Some(days_ago(1))),
                entry("kept", "body.", Some(days_ago(1))),
            ],
        );

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        assert_eq!(titles(&items), ["kept"]);
    }

    #[test]
    fn same_title_from_different_sources_is_kept_twice() {
        let catalog = catalog(&[("Tech", "A", "u1"), ("Tech", "B", "u2")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("Shared", "", Some(days_ago(1)))])
            .with("u2", vec![entry("Shared", "", Some(days_ago(1)))]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        let sources: Vec<_> = items.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["A", "B"], "equal dates keep insertion order");
    }

    #[test]
    fn missing_link_becomes_empty_string() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let mut e = entry("no link", "", Some(days_ago(1)));
        e.link = None;
        let fetcher = FixtureFetcher::default().with("u1", vec![e]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 7));
        assert_eq!(items[0].link, "");
    }

    // -- failures and limits ---------------------------------------------------

    #[test]
    fn failing_feed_does_not_abort_run() {
        let catalog = catalog(&[("Tech", "Dead", "dead"), ("Tech", "Live", "u1")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("survivor", "", Some(days_ago(1)))]);

        let aggregator = Aggregator::new(&catalog, &fetcher);
        let items = aggregator.aggregate_at(now(), &params(7, 7));

        assert_eq!(titles(&items), ["survivor"]);
        assert_eq!(fetcher.calls.get(), 2, "every source is attempted");
    }

    #[test]
    fn limit_zero_is_empty() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("a", "", Some(days_ago(1)))]);

        let items = Aggregator::new(&catalog, fetcher).aggregate_at(now(), &params(7, 0));
        assert!(items.is_empty());
    }

    #[test]
    fn result_never_exceeds_limit_and_is_sorted() {
        let catalog = catalog(&[("A", "S1", "u1"), ("B", "S2", "u2")]);
        let fetcher = FixtureFetcher::default()
            .with(
                "u1",
                (0..6).map(|i| entry(&format!("a{i}"), "", Some(days_ago(i)))).collect(),
            )
            .with(
                "u2",
                (0..6)
                    .map(|i| entry(&format!("b{i}"), "", Some(days_ago(i))))
                    .chain([entry("b-undated", "", None)])
                    .collect(),
            );
        let aggregator = Aggregator::new(&catalog, fetcher);

        for limit in [1, 5, 12, 13, 50] {
            let items = aggregator.aggregate_at(now(), &params(7, limit));
            assert_eq!(items.len(), limit.min(13));
            assert!(items.windows(2).all(|w| w[0].date >= w[1].date));
        }
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let catalog = FeedCatalog::default();
        let items = Aggregator::new(&catalog, FixtureFetcher::default())
            .aggregate_at(now(), &RunParams::default());
        assert!(items.is_empty());
    }

    // -- summariser selection --------------------------------------------------

    #[test]
    fn external_summarizer_only_used_when_requested() {
        let catalog = catalog(&[("Tech", "Feed", "u1")]);
        let fetcher = FixtureFetcher::default()
            .with("u1", vec![entry("t", "One. Two. Three.", Some(days_ago(1)))]);
        let aggregator = Aggregator::new(&catalog, fetcher)
            .with_external_summarizer(Box::new(ExternalSummarizer::new(UpperBackend)));

        let naive = aggregator.aggregate_at(now(), &params(7, 7));
        assert_eq!(naive[0].summary, "One. Two.");

        let external = aggregator.aggregate_at(
            now(),
            &RunParams {
                use_external_summarizer: true,
                ..params(7, 7)
            },
        );
        assert!(external[0].summary.ends_with("ONE. TWO. THREE."));
    }
}
