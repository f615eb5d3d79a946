//! Text processing: sentence splitting and bounded chunking.

pub mod chunker;
pub mod sentences;

pub use chunker::{
    DEFAULT_EMBEDDING_CHUNK_CHARS, DEFAULT_PLAYBACK_CHUNK_CHARS, chunk_for_embedding,
    split_for_playback,
};

use serde::{Deserialize, Serialize};

/// A bounded, contiguous span of a book's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable position within the book's chunk sequence
    pub index: usize,
    /// The text content
    pub text: String,
    /// Length of `text` in characters
    pub char_count: usize,
}

impl Chunk {
    /// Create a chunk, deriving the character count from the text.
    pub fn new(index: usize, text: String) -> Self {
        let char_count = text.chars().count();
        Self {
            index,
            text,
            char_count,
        }
    }
}

/// Summary counts produced alongside chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkStatistics {
    pub total_chunks: usize,
    pub total_characters: usize,
    /// Content source tag, e.g. "gutenberg"
    pub source: String,
}

impl ChunkStatistics {
    pub fn from_chunks(chunks: &[Chunk], source: &str) -> Self {
        Self {
            total_chunks: chunks.len(),
            total_characters: chunks.iter().map(|c| c.char_count).sum(),
            source: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = Chunk::new(1, "Hello world".to_string());
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.text, "Hello world");
        assert_eq!(chunk.char_count, 11);
    }

    #[test]
    fn test_chunk_char_count_is_unicode_aware() {
        let chunk = Chunk::new(0, "café".to_string());
        assert_eq!(chunk.char_count, 4);
    }

    #[test]
    fn test_statistics_from_chunks() {
        let chunks = vec![
            Chunk::new(0, "abcde".to_string()),
            Chunk::new(1, "fgh".to_string()),
        ];
        let stats = ChunkStatistics::from_chunks(&chunks, "gutenberg");
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_characters, 8);
        assert_eq!(stats.source, "gutenberg");
    }
}
