//! Summarisation strategies.
//!
//! Both strategies implement [`Summarizer`]; the aggregator picks one per run
//! and never needs to know which.
//!
//! * [`NaiveSummarizer`]: first sentences, capped length.  Local and pure.
//! * [`ExternalSummarizer`]: asks a text-generation service, falling back to
//!   the naive strategy on any failure.

pub mod external;
mod naive;

pub use naive::NaiveSummarizer;

use external::{ChatClient, ExternalSummarizer};

use tracing::warn;

/// Reduce a block of text to a short synopsis.
///
/// Implementations never fail: the worst case is a naive summary.  Empty
/// input yields empty output.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> String;
}

impl<S: Summarizer + ?Sized> Summarizer for Box<S> {
    fn summarize(&self, text: &str) -> String {
        (**self).summarize(text)
    }
}

/// The external strategy backed by the environment-configured chat client.
///
/// When the client cannot be configured the service is unreachable by
/// definition, so the naive strategy is returned directly.
pub fn external_from_env() -> Box<dyn Summarizer> {
    match ChatClient::from_env() {
        Ok(client) => Box::new(ExternalSummarizer::new(client)),
        Err(e) => {
            warn!(error = %e, "external summarizer unavailable, using naive summaries");
            Box::new(NaiveSummarizer::default())
        }
    }
}
