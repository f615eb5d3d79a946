//! The caller-facing facade over the content pipeline.

use std::sync::Arc;

use log::info;
use model_client::{ChatProvider, EmbeddingProvider, GenerationRequest};
use serde::Serialize;

use crate::config::LecternConfig;
use crate::content::{BookContent, BookMetadata, ContentFetcher};
use crate::error::{LecternError, Result};
use crate::generator::BackgroundGenerator;
use crate::pipeline::{Pipeline, ProcessedContent};
use crate::retrieval::{self, QUERY_CONTEXT_CHUNKS, SENTIMENT_SAMPLE_CHUNKS};
use crate::sentiment::{self, SENTIMENT_TEMPERATURE, SentimentReport};
use crate::store::EmbeddingStore;
use crate::text;

/// System prompt for grounded question answering.
const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about a \
     book using only the provided excerpts. If the excerpts do not contain the answer, say so.";

/// Book content plus the processed chunk/embedding view.
#[derive(Debug, Clone, Serialize)]
pub struct ContentWithProcessing {
    pub pages: Vec<String>,
    pub total_pages: usize,
    pub processed_content: ProcessedContent,
}

/// Answer to a grounded question about a book.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub book_id: String,
    pub query: String,
    pub response: String,
}

/// The book service: ties the content fetcher, embedding cache,
/// background generator, and generative collaborator together.
pub struct Library {
    fetcher: Arc<dyn ContentFetcher>,
    store: Arc<dyn EmbeddingStore>,
    chat: Arc<dyn ChatProvider>,
    pipeline: Arc<Pipeline>,
    generator: BackgroundGenerator,
    playback_chunk_chars: usize,
}

impl Library {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        store: Arc<dyn EmbeddingStore>,
        chat: Arc<dyn ChatProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &LecternConfig,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::new(
            embedder,
            Arc::clone(&store),
            config.embedding_chunk_chars,
        ));
        let generator = BackgroundGenerator::new(Arc::clone(&fetcher), Arc::clone(&pipeline));

        Self {
            fetcher,
            store,
            chat,
            pipeline,
            generator,
            playback_chunk_chars: config.playback_chunk_chars,
        }
    }

    /// Book metadata. Also kicks off background embedding generation so a
    /// later query or sentiment request can be served from the cache.
    pub async fn book(&self, book_id: &str) -> Result<BookMetadata> {
        let metadata = self
            .fetcher
            .fetch_metadata(book_id)
            .await?
            .ok_or_else(|| LecternError::BookNotFound(book_id.to_string()))?;

        self.ensure_generation_started(book_id).await;
        Ok(metadata)
    }

    /// Idempotent trigger for background generation.
    pub async fn ensure_generation_started(&self, book_id: &str) {
        self.generator.schedule(book_id).await;
    }

    /// Wait for any in-flight background generation for `book_id`.
    pub async fn wait_for_generation(&self, book_id: &str) {
        self.generator.wait_for(book_id).await;
    }

    /// Fetch a book's content and process it now, replacing any cache
    /// entry. The synchronous path for callers that need full detail
    /// immediately instead of waiting on the background pass.
    pub async fn content_with_processing(&self, book_id: &str) -> Result<ContentWithProcessing> {
        let content = self.fetch_required_content(book_id).await?;
        let processed_content = self
            .pipeline
            .generate_and_store(book_id, &content.full_text())
            .await?;

        Ok(ContentWithProcessing {
            total_pages: content.total_pages(),
            pages: content.pages,
            processed_content,
        })
    }

    /// Answer a question about a book, grounded on cached chunks.
    ///
    /// Requires a cache entry; callers seeing `EmbeddingsNotReady` should
    /// retry shortly, since generation may be in flight.
    pub async fn answer_query(
        &self,
        book_id: &str,
        query: &str,
        temperature: f32,
    ) -> Result<QueryAnswer> {
        let entry = self
            .store
            .get(book_id)
            .await?
            .ok_or_else(|| LecternError::EmbeddingsNotReady(book_id.to_string()))?;

        let context = retrieval::context_window(&entry.records, QUERY_CONTEXT_CHUNKS);
        let request = GenerationRequest::new(query)
            .with_system_prompt(ANSWER_SYSTEM_PROMPT)
            .with_context(context)
            .with_temperature(temperature);

        let response = self.chat.generate(request).await?;

        Ok(QueryAnswer {
            book_id: book_id.to_string(),
            query: query.to_string(),
            response: response.content,
        })
    }

    /// Book-wide sentiment over a sample of cached chunks.
    ///
    /// On a cache miss this schedules background generation before
    /// reporting not-ready, so a retry can succeed.
    pub async fn summarize_sentiment(&self, book_id: &str) -> Result<SentimentReport> {
        let Some(entry) = self.store.get(book_id).await? else {
            info!(
                "embeddings for book {} not found, scheduling background generation",
                book_id
            );
            self.ensure_generation_started(book_id).await;
            return Err(LecternError::EmbeddingsNotReady(book_id.to_string()));
        };

        let sample = retrieval::context_window(&entry.records, SENTIMENT_SAMPLE_CHUNKS);
        let request = GenerationRequest::new(sentiment::build_prompt(&sample))
            .with_temperature(SENTIMENT_TEMPERATURE);

        let response = self.chat.generate(request).await?;
        Ok(sentiment::parse_response(&response.content))
    }

    /// Split arbitrary text into playback-sized chunks (no embedding
    /// involved), for text-to-speech sizing.
    pub fn split_for_playback(
        &self,
        text: &str,
        max_chunk_chars: Option<usize>,
    ) -> Result<Vec<String>> {
        text::split_for_playback(text, max_chunk_chars.unwrap_or(self.playback_chunk_chars))
    }

    async fn fetch_required_content(&self, book_id: &str) -> Result<BookContent> {
        self.fetcher
            .fetch_content(book_id)
            .await?
            .ok_or_else(|| LecternError::BookNotFound(book_id.to_string()))
    }
}
