//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for interacting with various LLM providers:
//! - **Ollama**: Local LLM inference (default feature)
//! - **OpenAI**: OpenAI and compatible chat-completion endpoints

use crate::types::{AppError, ChatMessage, Result};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .generate_with_messages(&[ChatMessage::user(prompt)])
            .await?;
        Ok(response.content)
    }

    /// Generate from a full chat transcript (system, history, question)
    async fn generate_with_messages(&self, messages: &[ChatMessage]) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Response from an LLM generation request
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// The reason generation stopped (e.g., "stop", "length")
    pub finish_reason: String,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// Sampling parameters forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.0,
        }
    }
}

/// Provider enum for runtime selection
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | Ollama | `ollama` (default) | Recommended for local |
/// | OpenAI | `openai` | Any OpenAI-compatible endpoint |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "granite3.1-dense:8b".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },

    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's Cargo feature is disabled or the
    /// client cannot be configured.
    pub async fn create_client(&self, params: GenerationParams) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), params)?,
            )),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                params,
            ))),

            #[allow(unreachable_patterns)]
            other => {
                let _ = params;
                Err(AppError::Configuration(format!(
                    "{} provider support is not compiled in; rebuild with the '{}' feature",
                    other.name(),
                    other.feature()
                )))
            }
        }
    }

    /// Check if this provider is compiled in
    pub fn is_implemented(&self) -> bool {
        match self {
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
            Provider::OpenAI { .. } => cfg!(feature = "openai"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
            Provider::OpenAI { .. } => "OpenAI",
        }
    }

    fn feature(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "ollama",
            Provider::OpenAI { .. } => "openai",
        }
    }

    /// Model identifier sent to the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } | Provider::OpenAI { model, .. } => model,
        }
    }
}

/// Resolves provider/model names to ready clients
///
/// Query helpers hold a loader rather than a client so the model can be
/// selected per request.
#[async_trait]
pub trait LLMLoader: Send + Sync {
    async fn load(
        &self,
        provider: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<Box<dyn LLMClient>>;
}
