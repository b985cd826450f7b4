//! Plain-text normalisation for feed fields.
//!
//! Feed titles and descriptions routinely carry HTML (paragraphs, links,
//! entities).  [`normalize`] parses the input as an HTML fragment, keeps only
//! the text nodes, and squeezes all whitespace into single spaces.

use scraper::Html;

/// Strip markup and collapse whitespace.
///
/// Text nodes are joined with a space so that `<p>a</p><p>b</p>` reads as
/// `a b` rather than `ab`.  Entities are decoded by the HTML parser.  Total:
/// any input, including the empty string, produces a value.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Collapse every whitespace run (including newlines and NBSP) into one space
/// and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
