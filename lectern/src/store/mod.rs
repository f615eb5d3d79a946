//! Embedding cache: per-book persisted chunk embeddings.

mod fs;

pub use fs::FsStore;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::text::ChunkStatistics;

/// One chunk's text and embedding vector.
///
/// Records for a book are stored in `chunk_index` order, and a completed
/// generation has exactly one record per chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub chunk_index: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

/// A complete cache entry for one book identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedBook {
    pub book_id: String,
    /// Content source tag, e.g. "gutenberg"
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub statistics: ChunkStatistics,
    pub records: Vec<EmbeddingRecord>,
}

/// Key-value store for cache entries, keyed by book identity.
///
/// `put` replaces the whole entry atomically: a concurrent reader sees
/// either the previous entry or the new one, never a partial record set.
/// `get` is read-only and never triggers generation; absence is a
/// first-class result, not an error.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn put(&self, entry: &CachedBook) -> Result<()>;

    async fn get(&self, book_id: &str) -> Result<Option<CachedBook>>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CachedBook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn put(&self, entry: &CachedBook) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.book_id.clone(), entry.clone());
        Ok(())
    }

    async fn get(&self, book_id: &str) -> Result<Option<CachedBook>> {
        Ok(self.entries.read().await.get(book_id).cloned())
    }
}

#[cfg(test)]
pub(crate) fn entry_fixture(book_id: &str, texts: &[&str]) -> CachedBook {
    let records: Vec<EmbeddingRecord> = texts
        .iter()
        .enumerate()
        .map(|(chunk_index, text)| EmbeddingRecord {
            chunk_index,
            text: text.to_string(),
            vector: vec![chunk_index as f32; 4],
        })
        .collect();

    let chunks: Vec<crate::text::Chunk> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| crate::text::Chunk::new(i, text.to_string()))
        .collect();

    CachedBook {
        book_id: book_id.to_string(),
        source: "gutenberg".to_string(),
        generated_at: Utc::now(),
        statistics: ChunkStatistics::from_chunks(&chunks, "gutenberg"),
        records,
    }
}
