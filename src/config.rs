//! Feed catalog and run parameters.
//!
//! The catalog is plain data: an ordered list of categories, each holding an
//! ordered list of feed sources.  It is built once at startup (either the
//! built-in table or a TOML file given on the command line) and handed to the
//! [`Aggregator`](crate::aggregator::Aggregator) by reference.
//!
//! ## Catalog file format
//!
//! ```toml
//! [[category]]
//! label = "Tech"
//!
//! [[category.source]]
//! name = "TechCrunch"
//! url = "https://techcrunch.com/feed/"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One feed endpoint: a display name and the URL it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A labelled group of feed sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub label: String,
    #[serde(rename = "source", default)]
    pub sources: Vec<FeedSource>,
}

impl Category {
    pub fn new(label: impl Into<String>, sources: Vec<FeedSource>) -> Self {
        Self {
            label: label.into(),
            sources,
        }
    }
}

/// The full set of categories the aggregator walks, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FeedCatalog {
    #[serde(rename = "category", default)]
    pub categories: Vec<Category>,
}

impl FeedCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(vec![
            Category::new(
                "Маркетинг",
                vec![
                    FeedSource::new("Marketing Dive", "https://www.marketingdive.com/feeds/news/"),
                    FeedSource::new("HubSpot Blog", "https://blog.hubspot.com/marketing/rss.xml"),
                ],
            ),
            Category::new(
                "Технологии",
                vec![
                    FeedSource::new("TechCrunch", "http://feeds.feedburner.com/Techcrunch/"),
                    FeedSource::new("The Verge", "https://www.theverge.com/rss/index.xml"),
                ],
            ),
            Category::new(
                "Реклама",
                vec![
                    FeedSource::new("Adweek", "https://www.adweek.com/feed/"),
                    FeedSource::new("Campaign US", "https://www.campaignlive.com/us/rss"),
                ],
            ),
            Category::new(
                "Искусственный интеллект",
                vec![
                    FeedSource::new("VentureBeat – AI", "https://venturebeat.com/category/ai/feed/"),
                    FeedSource::new("The Decoder", "https://the-decoder.com/feed/"),
                ],
            ),
            Category::new(
                "Социальные сети",
                vec![
                    FeedSource::new("Social Media Today", "https://www.socialmediatoday.com/.rss/full/"),
                    FeedSource::new("Mashable – Social Media", "https://mashable.com/feeds/social-media/"),
                ],
            ),
        ])
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid feed catalog")
    }

    /// Read and parse a catalog file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read feed catalog {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// Total number of configured sources across all categories.
    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }
}

/// Per-run knobs for one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Recency window in days.
    pub days: u32,
    /// Maximum number of digest items returned.
    pub limit: usize,
    /// Summarise through the external text-generation service.
    pub use_external_summarizer: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            days: 7,
            limit: 7,
            use_external_summarizer: false,
        }
    }
}
