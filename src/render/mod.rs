//! Presentation of a finished digest.
//!
//! Two independent renderers over the same ordered items: a coloured console
//! view ([`console`]) and a Markdown file ([`markdown`]).

pub mod console;
pub mod markdown;
