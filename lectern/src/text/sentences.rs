//! Sentence splitting shared by both chunking modes.
//!
//! The boundary rule is deliberately simple: a sentence ends at `.`, `!`,
//! or `?` followed by whitespace. Abbreviations and decimal numbers are
//! not special-cased.

use once_cell::sync::Lazy;
use regex::Regex;

/// A terminator character immediately followed by whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex should compile"));

/// Split text into sentences at terminator-plus-whitespace boundaries.
///
/// Terminators stay attached to their sentence; the boundary whitespace
/// is dropped. A trailing fragment without a terminator is kept as the
/// final sentence.
pub fn split_into_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The terminator is a single ASCII byte, so +1 keeps it with the
        // sentence and skips none of the following whitespace.
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }

    if start < text.len() {
        let tail = &text[start..];
        if !tail.trim().is_empty() {
            sentences.push(tail);
        }
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let sentences = split_into_sentences("Hello world. This is a test! Is it working?");
        assert_eq!(
            sentences,
            vec!["Hello world.", "This is a test!", "Is it working?"]
        );
    }

    #[test]
    fn test_terminator_without_whitespace_does_not_split() {
        // Decimal point is followed by a digit, not whitespace
        let sentences = split_into_sentences("Pi is 3.14 and that is all.");
        assert_eq!(sentences, vec!["Pi is 3.14 and that is all."]);
    }

    #[test]
    fn test_stacked_terminators() {
        let sentences = split_into_sentences("Really!? Yes.");
        assert_eq!(sentences, vec!["Really!?", "Yes."]);
    }

    #[test]
    fn test_no_trailing_terminator() {
        let sentences = split_into_sentences("First sentence. An unfinished thought");
        assert_eq!(sentences, vec!["First sentence.", "An unfinished thought"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_into_sentences("").is_empty());
        assert!(split_into_sentences("   \n\n  ").is_empty());
    }

    #[test]
    fn test_newline_counts_as_boundary_whitespace() {
        let sentences = split_into_sentences("One.\nTwo.");
        assert_eq!(sentences, vec!["One.", "Two."]);
    }
}
