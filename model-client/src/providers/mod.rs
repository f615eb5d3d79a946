//! Model provider implementations

pub mod mock;
mod openai_compatible;

pub use mock::{MockChatProvider, MockEmbeddingProvider};
pub use openai_compatible::OpenAiCompatibleProvider;

use std::sync::Arc;

use crate::chat::ChatProvider;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::{ModelError, Result};

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Self::OpenAi),
            "openrouter" | "open-router" => Ok(Self::OpenRouter),
            _ => Err(ModelError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Default API base URL for this provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::OpenRouter => "OpenRouter",
        }
    }
}

/// Build the chat and embedding provider pair described by `config`.
///
/// Both trait objects are backed by the same HTTP provider instance.
pub fn build_providers(
    config: &Config,
) -> Result<(Arc<dyn ChatProvider>, Arc<dyn EmbeddingProvider>)> {
    let kind = ProviderKind::from_str(&config.provider)?;
    let api_key = get_api_key(config, kind)?;
    let base_url = config
        .base_url
        .as_deref()
        .unwrap_or_else(|| kind.default_base_url());

    let provider = Arc::new(OpenAiCompatibleProvider::new(
        base_url,
        api_key,
        &config.chat_model,
        &config.embedding_model,
        kind.display_name(),
    ));

    let chat: Arc<dyn ChatProvider> = provider.clone();
    let embedder: Arc<dyn EmbeddingProvider> = provider;
    Ok((chat, embedder))
}

/// Get API key from config or environment variable
fn get_api_key(config: &Config, kind: ProviderKind) -> Result<String> {
    if let Some(key) = config.api_key.clone() {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| ModelError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}
