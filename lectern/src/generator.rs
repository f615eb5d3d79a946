//! Fire-and-forget background generation with per-book single-flight.

use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info};
use tokio::sync::{Mutex, watch};

use crate::content::ContentFetcher;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Schedules chunking and embedding for a book without blocking the
/// caller.
///
/// Concurrent triggers for the same book identity collapse onto the one
/// in-flight run, so at most one generation run is active per book at a
/// time; late callers can await its completion instead of re-triggering.
/// Errors inside a run are logged and swallowed, leaving the cache
/// unchanged.
#[derive(Clone)]
pub struct BackgroundGenerator {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn ContentFetcher>,
    pipeline: Arc<Pipeline>,
    in_flight: Mutex<HashMap<String, watch::Receiver<bool>>>,
}

impl BackgroundGenerator {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                pipeline,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Idempotent trigger: spawns a generation run for `book_id` unless
    /// one is already in flight.
    pub async fn schedule(&self, book_id: &str) {
        let mut in_flight = self.inner.in_flight.lock().await;
        if in_flight.contains_key(book_id) {
            return;
        }

        let (done_tx, done_rx) = watch::channel(false);
        in_flight.insert(book_id.to_string(), done_rx);
        drop(in_flight);

        let inner = Arc::clone(&self.inner);
        let book_id = book_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = run(&inner, &book_id).await {
                // Nobody is waiting on this result; leave the cache as it was.
                error!("background generation for book {} failed: {}", book_id, err);
            }
            inner.in_flight.lock().await.remove(&book_id);
            let _ = done_tx.send(true);
        });
    }

    /// Wait for an in-flight run for `book_id`, if any.
    ///
    /// Returns immediately when nothing is scheduled for that book.
    pub async fn wait_for(&self, book_id: &str) {
        let receiver = self.inner.in_flight.lock().await.get(book_id).cloned();
        let Some(mut receiver) = receiver else {
            return;
        };

        while !*receiver.borrow() {
            if receiver.changed().await.is_err() {
                break;
            }
        }
    }

    /// Number of runs currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().await.len()
    }
}

async fn run(inner: &Inner, book_id: &str) -> Result<()> {
    info!("starting background processing for book {}", book_id);

    let Some(content) = inner.fetcher.fetch_content(book_id).await? else {
        info!("no content found for book {}, nothing to process", book_id);
        return Ok(());
    };

    let processed = inner
        .pipeline
        .generate_and_store(book_id, &content.full_text())
        .await?;

    info!(
        "background processing completed for book {}: {} chunks",
        book_id, processed.statistics.total_chunks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BookContent, BookMetadata};
    use crate::store::{EmbeddingStore, MemoryStore};
    use async_trait::async_trait;
    use model_client::{MockEmbeddingProvider, ModelError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowFetcher {
        pages: Vec<String>,
        fetches: AtomicUsize,
    }

    impl SlowFetcher {
        fn new(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentFetcher for SlowFetcher {
        async fn fetch_metadata(&self, book_id: &str) -> Result<Option<BookMetadata>> {
            Ok(Some(BookMetadata {
                id: book_id.to_string(),
                title: "Test Book".to_string(),
                authors: vec!["Tester".to_string()],
                language: Some("en".to_string()),
            }))
        }

        async fn fetch_content(&self, _book_id: &str) -> Result<Option<BookContent>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(Some(BookContent {
                pages: self.pages.clone(),
            }))
        }
    }

    struct MissingFetcher;

    #[async_trait]
    impl ContentFetcher for MissingFetcher {
        async fn fetch_metadata(&self, _book_id: &str) -> Result<Option<BookMetadata>> {
            Ok(None)
        }

        async fn fetch_content(&self, _book_id: &str) -> Result<Option<BookContent>> {
            Ok(None)
        }
    }

    fn generator_with(
        fetcher: Arc<dyn ContentFetcher>,
        store: Arc<MemoryStore>,
        embedder: MockEmbeddingProvider,
    ) -> BackgroundGenerator {
        let pipeline = Arc::new(Pipeline::new(Arc::new(embedder), store, 1000));
        BackgroundGenerator::new(fetcher, pipeline)
    }

    #[tokio::test]
    async fn test_schedule_populates_cache() {
        let fetcher = Arc::new(SlowFetcher::new(&["A page of text."]));
        let store = Arc::new(MemoryStore::new());
        let generator =
            generator_with(fetcher.clone(), store.clone(), MockEmbeddingProvider::new(8));

        generator.schedule("42").await;
        generator.wait_for("42").await;

        let cached = store.get("42").await.unwrap().unwrap();
        assert_eq!(cached.records.len(), 1);
        assert_eq!(generator.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_deduplicate() {
        let fetcher = Arc::new(SlowFetcher::new(&["A page of text."]));
        let store = Arc::new(MemoryStore::new());
        let generator =
            generator_with(fetcher.clone(), store.clone(), MockEmbeddingProvider::new(8));

        generator.schedule("42").await;
        generator.schedule("42").await;
        generator.schedule("42").await;
        assert_eq!(generator.in_flight().await, 1);

        generator.wait_for("42").await;
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_books_run_independently() {
        let fetcher = Arc::new(SlowFetcher::new(&["A page of text."]));
        let store = Arc::new(MemoryStore::new());
        let generator =
            generator_with(fetcher.clone(), store.clone(), MockEmbeddingProvider::new(8));

        generator.schedule("42").await;
        generator.schedule("43").await;
        assert_eq!(generator.in_flight().await, 2);

        generator.wait_for("42").await;
        generator.wait_for("43").await;
        assert!(store.get("42").await.unwrap().is_some());
        assert!(store.get("43").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_run_leaves_cache_unchanged() {
        let fetcher = Arc::new(SlowFetcher::new(&["A page of text."]));
        let store = Arc::new(MemoryStore::new());
        let generator = generator_with(
            fetcher,
            store.clone(),
            MockEmbeddingProvider::always_fails(ModelError::ApiError {
                message: "upstream down".to_string(),
                status_code: Some(500),
            }),
        );

        generator.schedule("42").await;
        generator.wait_for("42").await;

        assert!(store.get("42").await.unwrap().is_none());
        assert_eq!(generator.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_missing_content_is_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        let generator = generator_with(
            Arc::new(MissingFetcher),
            store.clone(),
            MockEmbeddingProvider::new(8),
        );

        generator.schedule("unknown").await;
        generator.wait_for("unknown").await;
        assert!(store.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wait_for_unscheduled_book_returns_immediately() {
        let store = Arc::new(MemoryStore::new());
        let generator = generator_with(
            Arc::new(MissingFetcher),
            store,
            MockEmbeddingProvider::new(8),
        );
        generator.wait_for("never-scheduled").await;
    }
}
