//! Mock providers for testing
//!
//! Configurable chat and embedding mocks that can simulate failures,
//! record requests, and produce deterministic vectors.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chat::{ChatProvider, GenerationRequest, GenerationResponse};
use crate::embedding::EmbeddingProvider;
use crate::error::{ModelError, Result};

/// A mock chat provider for testing fallback and parsing behavior
pub struct MockChatProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Mutex<Option<ModelError>>,
    /// Response content to return on success
    success_response: String,
    /// Last request seen, for asserting prompts and context windows
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockChatProvider {
    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: ModelError, response: &str) -> Self {
        Self {
            fail_count: AtomicUsize::new(n),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            success_response: response.to_string(),
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: ModelError) -> Self {
        Self {
            fail_count: AtomicUsize::new(usize::MAX),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            success_response: String::new(),
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider that always succeeds with the given content
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            success_response: response.to_string(),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of times generate() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the most recent request, if any
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        *self.last_request.lock().unwrap() = Some(request);

        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let fail_count = self.fail_count.load(Ordering::SeqCst);

        if call_num < fail_count {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(GenerationResponse {
            content: self.success_response.clone(),
            model: "mock-chat".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Deterministic mock embedding provider.
///
/// Vectors are derived from the input bytes, so identical text always
/// produces the identical fixed-dimension vector.
pub struct MockEmbeddingProvider {
    dimension: usize,
    call_count: AtomicUsize,
    fail_with: Mutex<Option<ModelError>>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: ModelError) -> Self {
        Self {
            dimension: 8,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
        }
    }

    /// Get the number of times embed() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.fail_with.lock().unwrap().as_ref() {
            return Err(clone_error(err));
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += byte as f32 / 255.0;
        }
        let scale = text.len().max(1) as f32;
        for component in &mut vector {
            *component /= scale;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }
}

/// Clone a ModelError (needed because ModelError doesn't implement Clone)
fn clone_error(err: &ModelError) -> ModelError {
    match err {
        ModelError::MissingApiKey { provider, env_var } => ModelError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        ModelError::RateLimited { retry_after } => ModelError::RateLimited {
            retry_after: *retry_after,
        },
        ModelError::ServerOverloaded { message } => ModelError::ServerOverloaded {
            message: message.clone(),
        },
        ModelError::ApiError {
            message,
            status_code,
        } => ModelError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        ModelError::ConfigError(s) => ModelError::ConfigError(s.clone()),
        // IO and TOML errors can't be cloned; a generic stand-in is enough for mocks
        ModelError::Io(_) => ModelError::ConfigError("IO error (mock)".to_string()),
        ModelError::TomlParse(_) => ModelError::ConfigError("TOML parse error (mock)".to_string()),
        ModelError::TomlSerialize(_) => {
            ModelError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}
