//! Book content boundary: metadata, paginated raw text, and fetchers.

mod gutenberg;

pub use gutenberg::{DEFAULT_PAGE_CHARS, GutenbergFetcher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Book metadata from the content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMetadata {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub language: Option<String>,
}

/// Raw book text as an ordered sequence of pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookContent {
    pub pages: Vec<String>,
}

impl BookContent {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Full text for chunking: pages joined with a blank line, in order.
    pub fn full_text(&self) -> String {
        self.pages.join("\n\n")
    }
}

/// Source of book metadata and raw text.
///
/// Absence (an unknown book identity) is a first-class `None` result, not
/// an error; errors are reserved for transport failures.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_metadata(&self, book_id: &str) -> Result<Option<BookMetadata>>;

    async fn fetch_content(&self, book_id: &str) -> Result<Option<BookContent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_joins_pages_with_blank_line() {
        let content = BookContent {
            pages: vec!["Page one.".to_string(), "Page two.".to_string()],
        };
        assert_eq!(content.full_text(), "Page one.\n\nPage two.");
        assert_eq!(content.total_pages(), 2);
    }

    #[test]
    fn test_full_text_of_empty_content() {
        let content = BookContent { pages: vec![] };
        assert_eq!(content.full_text(), "");
    }
}
