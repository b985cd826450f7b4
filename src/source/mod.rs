//! Feed fetching abstraction.
//!
//! This module defines the [`FeedFetcher`] trait and the [`RawEntry`] type it
//! produces.  The HTTP implementation lives in [`http`]; tests substitute an
//! in-memory fetcher so the pipeline runs without a network.
//!
//! ## Adding a new transport
//!
//! 1. Create a new file in this directory (e.g. `file.rs`).
//! 2. Define a struct and implement [`FeedFetcher`] for it.
//! 3. Add `mod file;` below and re-export the struct.
//! 4. Construct it in `main.rs` instead of [`HttpFetcher`].

mod http;
mod raw_entry;

pub use http::HttpFetcher;
pub use raw_entry::RawEntry;

use anyhow::Result;

/// Anything that can turn a feed URL into raw entries.
///
/// Implementations return an error for unreachable, malformed or otherwise
/// unusable feeds.  The aggregator absorbs those errors: a failing feed
/// contributes zero entries and the run carries on.
pub trait FeedFetcher {
    /// Fetch and parse the feed at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<RawEntry>>;
}

impl<F: FeedFetcher + ?Sized> FeedFetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
        (**self).fetch(url)
    }
}
