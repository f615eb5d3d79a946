//! Context selection over cached embedding records.
//!
//! The policy is positional: the first `max_chunks` records in index
//! order, joined with blank lines. Similarity ranking against a query
//! embedding is the intended follow-on once a ranking index exists; the
//! positional window is the documented baseline contract.

use crate::store::EmbeddingRecord;

/// Chunks of grounding context for question answering.
pub const QUERY_CONTEXT_CHUNKS: usize = 3;

/// Chunks sampled for book-wide sentiment analysis.
pub const SENTIMENT_SAMPLE_CHUNKS: usize = 10;

/// Concatenate the text of the first `max_chunks` records, separated by
/// blank lines.
pub fn context_window(records: &[EmbeddingRecord], max_chunks: usize) -> String {
    records
        .iter()
        .take(max_chunks)
        .map(|record| record.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(texts: &[&str]) -> Vec<EmbeddingRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(chunk_index, text)| EmbeddingRecord {
                chunk_index,
                text: text.to_string(),
                vector: vec![0.0; 4],
            })
            .collect()
    }

    #[test]
    fn test_window_takes_prefix_in_order() {
        let records = records(&["one", "two", "three", "four"]);
        assert_eq!(context_window(&records, 3), "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_window_larger_than_records() {
        let records = records(&["only", "two"]);
        assert_eq!(context_window(&records, 10), "only\n\ntwo");
    }

    #[test]
    fn test_window_over_empty_records() {
        assert_eq!(context_window(&[], 3), "");
    }
}
