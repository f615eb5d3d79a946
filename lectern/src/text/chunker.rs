//! Sentence-accumulating chunkers for playback and embedding.

use super::sentences::split_into_sentences;
use super::{Chunk, ChunkStatistics};
use crate::error::{LecternError, Result};

/// Default soft limit for playback (text-to-speech) chunks, in characters.
pub const DEFAULT_PLAYBACK_CHUNK_CHARS: usize = 1000;

/// Default soft limit for embedding chunks, in characters.
pub const DEFAULT_EMBEDDING_CHUNK_CHARS: usize = 1000;

/// Split text into chunks at sentence boundaries.
///
/// Sentences accumulate into a buffer; the buffer is flushed as one chunk
/// (sentences joined by a single space) before adding a sentence that
/// would push the assembled chunk past `max_chunk_chars`. A single
/// sentence longer than the limit is never split mid-sentence; it becomes
/// its own chunk.
///
/// Empty input yields zero chunks. `max_chunk_chars` of zero is a
/// configuration error.
pub fn split_for_playback(text: &str, max_chunk_chars: usize) -> Result<Vec<String>> {
    if max_chunk_chars == 0 {
        return Err(LecternError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_chars = 0usize;

    for sentence in split_into_sentences(text) {
        let sentence_chars = sentence.chars().count();

        // Account for the joining space, so an assembled chunk never
        // exceeds the limit unless it is a single oversized sentence.
        if !current.is_empty() && current_chars + 1 + sentence_chars > max_chunk_chars {
            chunks.push(current.join(" "));
            current.clear();
            current_chars = 0;
        }

        if current.is_empty() {
            current_chars = sentence_chars;
        } else {
            current_chars += 1 + sentence_chars;
        }
        current.push(sentence);
    }

    // Don't forget the last chunk
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    Ok(chunks)
}

/// Chunk text for embedding: same flush rule as playback chunking, plus
/// stable indices and per-chunk character counts.
pub fn chunk_for_embedding(text: &str, max_chunk_chars: usize) -> Result<Vec<Chunk>> {
    let pieces = split_for_playback(text, max_chunk_chars)?;
    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::new(index, text))
        .collect())
}

/// Summary statistics for a chunked text.
pub fn statistics_for(chunks: &[Chunk], source: &str) -> ChunkStatistics {
    ChunkStatistics::from_chunks(chunks, source)
}
