//! Local sentence-truncation summariser.

use super::Summarizer;

pub const DEFAULT_MAX_SENTENCES: usize = 2;
pub const DEFAULT_MAX_CHARS: usize = 300;

const ELLIPSIS: &str = "...";

/// Keeps the first few sentences and caps the length.
///
/// Deterministic and pure: the same input always yields the same output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaiveSummarizer {
    pub max_sentences: usize,
    /// Character (not byte) cap before the ellipsis is applied.
    pub max_chars: usize,
}

impl Default for NaiveSummarizer {
    fn default() -> Self {
        Self {
            max_sentences: DEFAULT_MAX_SENTENCES,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl Summarizer for NaiveSummarizer {
    fn summarize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let summary = split_sentences(text)
            .into_iter()
            .take(self.max_sentences)
            .collect::<Vec<_>>()
            .join(" ");

        self.cap(summary)
    }
}

impl NaiveSummarizer {
    /// Apply the character cap alone, cutting at a word boundary and
    /// appending the ellipsis when the text is too long.
    pub fn cap(&self, text: String) -> String {
        if text.chars().count() > self.max_chars {
            let cut = truncate_at_word(&text, self.max_chars.saturating_sub(1));
            format!("{}{}", cut.trim_end(), ELLIPSIS)
        } else {
            text
        }
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace.
///
/// The terminal punctuation stays with its sentence; the whitespace run
/// between sentences is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        if !chars.peek().is_some_and(|&(_, next)| next.is_whitespace()) {
            continue;
        }
        sentences.push(&text[start..end]);
        while chars.peek().is_some_and(|&(_, next)| next.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map_or(text.len(), |&(j, _)| j);
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Take at most `max` characters, backing up to the last word boundary when
/// the cut would land inside a word.  A single word longer than `max` is cut
/// hard.
fn truncate_at_word(text: &str, max: usize) -> &str {
    let Some((byte_cut, next)) = text.char_indices().nth(max) else {
        return text;
    };
    let head = &text[..byte_cut];
    if next.is_whitespace() {
        return head;
    }
    match head.rfind(char::is_whitespace) {
        Some(boundary) if !head[..boundary].trim_end().is_empty() => &head[..boundary],
        _ => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive() -> NaiveSummarizer {
        NaiveSummarizer::default()
    }

    // -- sentence splitting ----------------------------------------------------

    #[test]
    fn splits_on_terminal_punctuation_followed_by_space() {
        assert_eq!(
            split_sentences("One. Two!  Three?\nFour"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn punctuation_without_space_does_not_split() {
        assert_eq!(
            split_sentences("Version 2.0 shipped. Next is v3.1!"),
            vec!["Version 2.0 shipped.", "Next is v3.1!"]
        );
    }

    #[test]
    fn trailing_whitespace_adds_no_empty_sentence() {
        assert_eq!(split_sentences("One. Two. "), vec!["One.", "Two."]);
    }

    // -- summarize -------------------------------------------------------------

    #[test]
    fn keeps_first_two_sentences() {
        assert_eq!(
            naive().summarize("Sentence one. Sentence two. Sentence three."),
            "Sentence one. Sentence two."
        );
    }

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(naive().summarize("Only one sentence"), "Only one sentence");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(naive().summarize(""), "");
    }

    #[test]
    fn long_text_is_capped_with_ellipsis() {
        let text = "word ".repeat(100);
        let out = naive().summarize(text.trim());
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= DEFAULT_MAX_CHARS - 1 + ELLIPSIS.len());
        assert!(!out.contains(" ..."), "trailing space before ellipsis: {out:?}");
    }

    #[test]
    fn truncation_avoids_cutting_words() {
        let s = NaiveSummarizer {
            max_sentences: 2,
            max_chars: 12,
        };
        // 11 chars = "alpha bravo", next char is ' ', so it's a clean cut.
        assert_eq!(s.summarize("alpha bravo charlie"), "alpha bravo...");
        // 11 chars = "alphaa brav", next char is 'o': back up to the space.
        assert_eq!(s.summarize("alphaa bravo charlie"), "alphaa...");
    }

    #[test]
    fn single_long_word_is_cut_hard() {
        let s = NaiveSummarizer {
            max_sentences: 2,
            max_chars: 6,
        };
        assert_eq!(s.summarize("abcdefghij"), "abcde...");
    }

    #[test]
    fn cap_counts_characters_not_bytes() {
        let s = NaiveSummarizer {
            max_sentences: 2,
            max_chars: 5,
        };
        assert_eq!(s.summarize("ёжик"), "ёжик");
        assert_eq!(s.summarize("ёжики бегут"), "ёжик...");
    }

    #[test]
    fn cap_ignores_sentence_count() {
        let s = NaiveSummarizer {
            max_sentences: 1,
            max_chars: 20,
        };
        assert_eq!(s.cap("One. Two. Three.".to_string()), "One. Two. Three.");
        assert_eq!(
            s.cap("alpha bravo charlie delta echo".to_string()),
            "alpha bravo charlie..."
        );
    }

    #[test]
    fn is_idempotent() {
        let text = "A first claim. A second claim! A third? ".repeat(20);
        let s = naive();
        assert_eq!(s.summarize(&text), s.summarize(&text));
    }
}
