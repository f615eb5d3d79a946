use async_trait::async_trait;

use crate::error::Result;

/// Trait for text embedding providers.
///
/// Implementations must be deterministic for identical input: embedding
/// the same text twice yields the same vector, so regenerating a book's
/// cache reproduces the previous content.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute a fixed-dimension embedding vector for `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving input order.
    ///
    /// The default implementation embeds sequentially; providers with a
    /// batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Model name used for the embeddings.
    fn model(&self) -> &str;
}
