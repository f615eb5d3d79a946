//! OpenAI-compatible API provider
//!
//! Covers both collaborator calls the pipeline needs against one API
//! surface: `/chat/completions` for generation and `/embeddings` for
//! per-chunk vectors. Works with OpenAI, OpenRouter, and other
//! compatible servers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatProvider, GenerationRequest, GenerationResponse, TokenUsage};
use crate::embedding::EmbeddingProvider;
use crate::error::{ModelError, Result};

/// Provider for OpenAI-compatible APIs
pub struct OpenAiCompatibleProvider {
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    name: &'static str,
    client: Client,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider
    pub fn new(
        base_url: &str,
        api_key: String,
        chat_model: &str,
        embedding_model: &str,
        name: &'static str,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
            name,
            client: Client::new(),
        }
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            // 503 and 429 are retryable and get their own variants
            return Err(match status.as_u16() {
                503 => ModelError::ServerOverloaded { message },
                429 => ModelError::RateLimited { retry_after: None },
                code => ModelError::ApiError {
                    message,
                    status_code: Some(code),
                },
            });
        }

        response.json().await.map_err(|e| ModelError::ApiError {
            message: format!("Failed to parse response: {}", e),
            status_code: None,
        })
    }
}

// OpenAI API request/response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Fold grounding context into the user message, if any.
fn user_content(request: &GenerationRequest) -> String {
    match request.context.as_deref() {
        Some(context) => format!(
            "Use the following book excerpts to answer.\n\nContext:\n{}\n\nQuestion: {}",
            context, request.prompt
        ),
        None => request.prompt.clone(),
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let mut messages = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(Message {
            role: "user".to_string(),
            content: user_content(&request),
        });

        let chat_request = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let chat_response: ChatCompletionResponse =
            self.post_json("/chat/completions", &chat_request).await?;

        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        let usage = chat_response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(GenerationResponse {
            content,
            model: self.chat_model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: text.to_string(),
        };

        let response: EmbeddingsResponse = self.post_json("/embeddings", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ModelError::ApiError {
                message: "Embeddings response contained no data".to_string(),
                status_code: None,
            })
    }

    fn model(&self) -> &str {
        &self.embedding_model
    }
}
