//! Configuration-backed LLM loader
//!
//! Resolves `[providers]` / `[models]` entries from `docs-summarizer.toml`
//! into [`Provider`] values and creates clients for them. The loader reads the
//! configuration through [`SummarizerConfigManager`], so settings picked up by
//! `reload()` apply to the next request.

use crate::llm::client::{GenerationParams, LLMClient, LLMLoader, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ProviderConfig, SummarizerConfig, SummarizerConfigManager};
use async_trait::async_trait;
use std::sync::Arc;

impl Provider {
    /// Build a provider from its TOML configuration and a model identifier
    ///
    /// API keys are read from the environment variable named in the config.
    pub fn from_config(config: &ProviderConfig, model: &str) -> Result<Self> {
        match config {
            ProviderConfig::Ollama { base_url } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.to_string(),
            }),
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.to_string(),
                })
            }
        }
    }
}

/// [`LLMLoader`] that resolves names through the configuration file
#[derive(Clone)]
pub struct ConfigBasedLLMLoader {
    config_manager: Arc<SummarizerConfigManager>,
}

impl ConfigBasedLLMLoader {
    pub fn new(config_manager: Arc<SummarizerConfigManager>) -> Self {
        Self { config_manager }
    }

    /// Create a loader over a fixed configuration (never reloaded)
    pub fn from_config(config: SummarizerConfig) -> Self {
        Self::new(Arc::new(SummarizerConfigManager::from_config(config)))
    }

    /// Resolve a `(provider name, model name)` pair to a [`Provider`]
    pub fn resolve(&self, provider_name: &str, model_name: &str) -> Result<Provider> {
        let config = self.config_manager.config();

        let model_config = config.get_model(model_name).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' not found in configuration", model_name))
        })?;

        if model_config.provider != provider_name {
            return Err(AppError::Configuration(format!(
                "Model '{}' is served by provider '{}', not '{}'",
                model_name, model_config.provider, provider_name
            )));
        }

        let provider_config = config.get_provider(provider_name).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' not found",
                provider_name, model_name
            ))
        })?;

        Provider::from_config(provider_config, &model_config.model)
    }
}

#[async_trait]
impl LLMLoader for ConfigBasedLLMLoader {
    async fn load(
        &self,
        provider: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<Box<dyn LLMClient>> {
        let provider = self.resolve(provider, model)?;
        tracing::debug!(provider = provider.name(), model = provider.model(), "Loading LLM client");
        provider.create_client(params).await
    }
}
