//! Command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::RunParams;

/// Weekly news digest: collects RSS/Atom feeds, keeps recent unique items,
/// summarises them, prints the result and saves it to digest.md.
#[derive(Parser, Debug)]
#[command(name = "news-digest", author, version, about, long_about = None)]
pub struct Args {
    /// How many days back to collect news for
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// Maximum number of news items to show
    #[arg(long, default_value_t = 7)]
    pub limit: usize,

    /// Summarise through the external text-generation service
    #[arg(long = "use-g4f")]
    pub use_g4f: bool,

    /// TOML feed catalog to use instead of the built-in one
    #[arg(long, value_name = "PATH")]
    pub feeds: Option<PathBuf>,

    /// Per-feed network timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 15)]
    pub timeout: u64,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn run_params(&self) -> RunParams {
        RunParams {
            days: self.days,
            limit: self.limit,
            use_external_summarizer: self.use_g4f,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
