//! Chunk, embed, and store: the single mutating path for the embedding cache.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;
use log::info;
use model_client::EmbeddingProvider;
use serde::Serialize;

use crate::error::Result;
use crate::store::{CachedBook, EmbeddingRecord, EmbeddingStore};
use crate::text::{self, Chunk, ChunkStatistics};

/// Source tag recorded in statistics and cache entries.
pub const SOURCE_GUTENBERG: &str = "gutenberg";

/// Everything produced by one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedContent {
    pub chunks: Vec<Chunk>,
    pub embeddings: Vec<EmbeddingRecord>,
    pub statistics: ChunkStatistics,
}

/// The generation pipeline: chunking, per-chunk embedding, and the atomic
/// cache write.
pub struct Pipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn EmbeddingStore>,
    max_chunk_chars: usize,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn EmbeddingStore>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            max_chunk_chars,
        }
    }

    /// Chunk `full_text`, embed every chunk, and atomically replace the
    /// cache entry for `book_id`.
    ///
    /// Embeddings for distinct chunks are independent and run
    /// concurrently; the join preserves chunk order, so
    /// `embeddings[i].chunk_index == i`. Nothing is written unless every
    /// chunk embedded successfully, leaving any prior entry intact on
    /// failure.
    pub async fn generate_and_store(
        &self,
        book_id: &str,
        full_text: &str,
    ) -> Result<ProcessedContent> {
        let chunks = text::chunk_for_embedding(full_text, self.max_chunk_chars)?;

        let vectors = try_join_all(chunks.iter().map(|chunk| self.embedder.embed(&chunk.text)))
            .await?;

        let embeddings: Vec<EmbeddingRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddingRecord {
                chunk_index: chunk.index,
                text: chunk.text.clone(),
                vector,
            })
            .collect();

        let statistics = ChunkStatistics::from_chunks(&chunks, SOURCE_GUTENBERG);
        let entry = CachedBook {
            book_id: book_id.to_string(),
            source: SOURCE_GUTENBERG.to_string(),
            generated_at: Utc::now(),
            statistics: statistics.clone(),
            records: embeddings.clone(),
        };
        self.store.put(&entry).await?;

        info!(
            "stored {} chunk embeddings for book {}",
            embeddings.len(),
            book_id
        );

        Ok(ProcessedContent {
            chunks,
            embeddings,
            statistics,
        })
    }
}
