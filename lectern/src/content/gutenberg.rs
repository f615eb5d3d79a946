//! Project Gutenberg fetcher backed by the Gutendex catalog API.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{BookContent, BookMetadata, ContentFetcher};
use crate::error::Result;

const DEFAULT_API_BASE: &str = "https://gutendex.com";

/// Default characters per page when paginating fetched book text.
pub const DEFAULT_PAGE_CHARS: usize = 3000;

/// Fetches book metadata from Gutendex and plain-text content from the
/// Project Gutenberg mirrors it points at.
pub struct GutenbergFetcher {
    client: Client,
    api_base: String,
    page_chars: usize,
}

impl GutenbergFetcher {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            page_chars: DEFAULT_PAGE_CHARS,
        }
    }

    pub fn with_page_chars(mut self, page_chars: usize) -> Self {
        self.page_chars = page_chars;
        self
    }

    async fn catalog_entry(&self, book_id: &str) -> Result<Option<CatalogBook>> {
        let url = format!("{}/books/{}", self.api_base, book_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        Ok(Some(response.json::<CatalogBook>().await?))
    }
}

impl Default for GutenbergFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogBook {
    title: String,
    #[serde(default)]
    authors: Vec<CatalogAuthor>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    formats: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CatalogAuthor {
    name: String,
}

impl CatalogBook {
    /// Pick a plain-text format URL, skipping zipped variants.
    fn plain_text_url(&self) -> Option<&str> {
        self.formats
            .iter()
            .find(|(mime, url)| mime.starts_with("text/plain") && !url.ends_with(".zip"))
            .map(|(_, url)| url.as_str())
    }
}

#[async_trait]
impl ContentFetcher for GutenbergFetcher {
    async fn fetch_metadata(&self, book_id: &str) -> Result<Option<BookMetadata>> {
        Ok(self.catalog_entry(book_id).await?.map(|book| BookMetadata {
            id: book_id.to_string(),
            title: book.title,
            authors: book.authors.into_iter().map(|a| a.name).collect(),
            language: book.languages.first().cloned(),
        }))
    }

    async fn fetch_content(&self, book_id: &str) -> Result<Option<BookContent>> {
        let Some(entry) = self.catalog_entry(book_id).await? else {
            return Ok(None);
        };
        let Some(text_url) = entry.plain_text_url() else {
            return Ok(None);
        };

        let raw = self
            .client
            .get(text_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let body = strip_boilerplate(&raw);
        Ok(Some(BookContent {
            pages: paginate(body, self.page_chars),
        }))
    }
}

/// Drop the Project Gutenberg license header and footer when the
/// `*** START OF ... ***` / `*** END OF ... ***` markers are present.
fn strip_boilerplate(raw: &str) -> &str {
    let start = raw
        .find("*** START OF")
        .and_then(|marker| raw[marker..].find('\n').map(|nl| marker + nl + 1))
        .unwrap_or(0);

    let end = raw[start..]
        .find("*** END OF")
        .map(|offset| start + offset)
        .unwrap_or(raw.len());

    raw[start..end].trim()
}

/// Split text into pages of roughly `page_chars` characters, preferring
/// paragraph boundaries. A single paragraph longer than a page becomes
/// its own page.
fn paginate(text: &str, page_chars: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let paragraph_chars = paragraph.chars().count();
        if !current.is_empty() && current_chars + 2 + paragraph_chars > page_chars {
            pages.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
            current_chars += 2;
        }
        current.push_str(paragraph);
        current_chars += paragraph_chars;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_boilerplate_with_markers() {
        let raw = "The Project Gutenberg eBook of Example\n\
                   *** START OF THE PROJECT GUTENBERG EBOOK EXAMPLE ***\n\
                   Actual book text here.\n\
                   *** END OF THE PROJECT GUTENBERG EBOOK EXAMPLE ***\n\
                   License text.";
        assert_eq!(strip_boilerplate(raw), "Actual book text here.");
    }

    #[test]
    fn test_strip_boilerplate_without_markers() {
        let raw = "Just some text.\nNo markers at all.";
        assert_eq!(strip_boilerplate(raw), raw);
    }

    #[test]
    fn test_paginate_keeps_paragraph_order() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let pages = paginate(text, 40);
        assert!(pages.len() > 1);
        let rejoined = pages.join("\n\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_paginate_small_text_is_one_page() {
        let pages = paginate("Tiny.\n\nText.", 1000);
        assert_eq!(pages, vec!["Tiny.\n\nText.".to_string()]);
    }

    #[test]
    fn test_paginate_empty_text() {
        assert!(paginate("", 1000).is_empty());
    }

    #[test]
    fn test_plain_text_url_skips_zip() {
        let mut formats = HashMap::new();
        formats.insert(
            "text/plain; charset=us-ascii".to_string(),
            "https://example.com/1.txt.zip".to_string(),
        );
        formats.insert(
            "text/plain; charset=utf-8".to_string(),
            "https://example.com/1.txt".to_string(),
        );
        let book = CatalogBook {
            title: "Example".to_string(),
            authors: vec![],
            languages: vec![],
            formats,
        };
        assert_eq!(book.plain_text_url(), Some("https://example.com/1.txt"));
    }
}
