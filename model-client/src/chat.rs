use async_trait::async_trait;

use crate::error::Result;

/// Request to send to a chat provider.
///
/// `context` carries grounding passages (book excerpts) that the provider
/// folds into the final prompt; `prompt` is the user's question or
/// instruction.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub context: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Attach grounding context. Empty context is treated as none.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from a chat provider.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token usage information.
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Execute a completion request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Get the provider name for display.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_is_dropped() {
        let request = GenerationRequest::new("question").with_context("");
        assert!(request.context.is_none());

        let request = GenerationRequest::new("question").with_context("a passage");
        assert_eq!(request.context.as_deref(), Some("a passage"));
    }
}
