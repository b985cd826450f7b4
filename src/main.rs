//! news-digest: a weekly digest of RSS/Atom news.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ urls  ┌──────────────┐  items  ┌─────────────────────┐
//! │ source/   │ ◄──── │ aggregator   │ ──────► │ render/console      │
//! │ (fetcher) │ ────► │ (pipeline)   │         │ render/markdown     │
//! └───────────┘ raw   └──────────────┘         └─────────────────────┘
//!                      │    │     │
//!                   text  date  summarize
//! ```
//!
//! * **`config`**: feed catalog (built-in or TOML) and run parameters.
//! * **`source/`**: the `FeedFetcher` trait and the HTTP implementation
//!   (RSS 2.0 and Atom 1.0).
//! * **`text`**, **`date`**: normalisation of titles, bodies and dates.
//! * **`summarize/`**: naive and external-service summarisers.
//! * **`digest`**: the output record, its ordering and fingerprint.
//! * **`aggregator`**: fetch → filter → dedup → summarise → sort → limit.
//! * **`render/`**: coloured console output and the `digest.md` file.
//! * **`main`**: wires everything together.

mod aggregator;
mod cli;
mod config;
mod date;
mod digest;
mod render;
mod source;
mod summarize;
mod text;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aggregator::Aggregator;
use cli::Args;
use config::{FeedCatalog, RunParams};
use render::{console, markdown};
use source::{FeedFetcher, HttpFetcher};

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let catalog = match &args.feeds {
        Some(path) => FeedCatalog::from_file(path)?,
        None => FeedCatalog::builtin(),
    };
    let params = args.run_params();
    info!(
        sources = catalog.source_count(),
        days = params.days,
        limit = params.limit,
        external = params.use_external_summarizer,
        "starting run"
    );

    let fetcher = HttpFetcher::new(args.fetch_timeout())?;
    let cwd = env::current_dir().context("cannot resolve working directory")?;
    run(&catalog, fetcher, &params, &cwd)?;
    Ok(())
}

/// Collect, print and save one digest into `dir`.
///
/// Returns the path of the written `digest.md`, or `None` when nothing was
/// found; in that case only the advisory is printed and no file is touched.
fn run<F: FeedFetcher>(
    catalog: &FeedCatalog,
    fetcher: F,
    params: &RunParams,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let mut aggregator = Aggregator::new(catalog, fetcher);
    if params.use_external_summarizer {
        aggregator = aggregator.with_external_summarizer(summarize::external_from_env());
    }

    console::print_collecting()?;
    let items = aggregator.aggregate(params);

    if items.is_empty() {
        console::print_empty()?;
        return Ok(None);
    }

    for category in &catalog.categories {
        let count = items.iter().filter(|i| i.category == category.label).count();
        if count > 0 {
            info!(category = %category.label, items = count, "digest section");
        }
    }

    console::print_digest(&items)?;
    let path = markdown::save(dir, &items)?;
    console::print_saved(&path)?;
    Ok(Some(path))
}
