//! Shared model-provider client for the lectern workspace
//!
//! Provides the two collaborator seams the content pipeline depends on:
//! - chat completion (question answering, sentiment analysis)
//! - text embedding (per-chunk vectors)
//!
//! One OpenAI-compatible HTTP implementation covers both, and mock
//! providers are exported for tests.

pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod providers;

pub use chat::{ChatProvider, GenerationRequest, GenerationResponse, TokenUsage};
pub use config::Config;
pub use embedding::EmbeddingProvider;
pub use error::{ModelError, Result};
pub use providers::{
    MockChatProvider, MockEmbeddingProvider, OpenAiCompatibleProvider, ProviderKind,
    build_providers,
};
