//! Query helpers: components that answer a user question with an LLM.
//!
//! Every helper is configured through [`QueryHelperOptions`], which resolves
//! the provider, model, sampling parameters and system prompt from the
//! configuration, with per-instance overrides.

pub mod docs_summarizer;

use std::sync::Arc;

use crate::llm::{GenerationParams, LLMLoader};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{RagConfig, SummarizerConfig};

pub use docs_summarizer::DocsSummarizer;

/// Shared configuration of a query helper
#[derive(Clone)]
pub struct QueryHelperOptions {
    pub provider: String,
    pub model: String,
    pub params: GenerationParams,
    pub context_window_size: usize,
    pub system_prompt: String,
    pub rag: RagConfig,
    pub llm_loader: Arc<dyn LLMLoader>,
}

impl std::fmt::Debug for QueryHelperOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHelperOptions")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("params", &self.params)
            .field("context_window_size", &self.context_window_size)
            .field("rag", &self.rag)
            .finish_non_exhaustive()
    }
}

impl QueryHelperOptions {
    /// Options for the configured default provider and model
    pub fn from_config(config: &SummarizerConfig, llm_loader: Arc<dyn LLMLoader>) -> Result<Self> {
        Self::for_model(config, llm_loader, None, None)
    }

    /// Options for an explicit model; the provider defaults to the one serving it
    pub fn for_model(
        config: &SummarizerConfig,
        llm_loader: Arc<dyn LLMLoader>,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self> {
        let model = model.unwrap_or(config.summarizer.default_model.as_str());
        let model_config = config.get_model(model).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' not found in configuration", model))
        })?;
        let provider = provider.unwrap_or(model_config.provider.as_str());

        Ok(Self {
            provider: provider.to_string(),
            model: model.to_string(),
            params: GenerationParams {
                max_tokens: model_config.max_tokens_for_response,
                temperature: model_config.temperature,
            },
            context_window_size: model_config.context_window_size,
            system_prompt: config.system_prompt()?,
            rag: config.summarizer.rag.clone(),
            llm_loader,
        })
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Common surface of components that answer questions with an LLM
pub trait QueryHelper: Send + Sync {
    fn options(&self) -> &QueryHelperOptions;

    fn provider(&self) -> &str {
        &self.options().provider
    }

    fn model(&self) -> &str {
        &self.options().model
    }

    fn system_prompt(&self) -> &str {
        &self.options().system_prompt
    }

    fn generation_params(&self) -> GenerationParams {
        self.options().params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ConfigBasedLLMLoader;
    use crate::prompts::DEFAULT_SYSTEM_PROMPT;

    const CONFIG: &str = r#"
[summarizer]
default_provider = "ollama-local"
default_model = "granite"

[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"

[models.granite]
provider = "ollama-local"
model = "granite3.1-dense:8b"
context_window_size = 8192
max_tokens_for_response = 256
temperature = 0.2

[models.small]
provider = "ollama-local"
model = "llama3.2:1b"
"#;

    fn loader(config: &SummarizerConfig) -> Arc<dyn LLMLoader> {
        Arc::new(ConfigBasedLLMLoader::from_config(config.clone()))
    }

    #[test]
    fn test_options_from_defaults() {
        let config = SummarizerConfig::parse(CONFIG).unwrap();
        let options = QueryHelperOptions::from_config(&config, loader(&config)).unwrap();

        assert_eq!(options.provider, "ollama-local");
        assert_eq!(options.model, "granite");
        assert_eq!(options.context_window_size, 8192);
        assert_eq!(options.params.max_tokens, 256);
        assert_eq!(options.params.temperature, 0.2);
        assert_eq!(options.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_options_for_other_model() {
        let config = SummarizerConfig::parse(CONFIG).unwrap();
        let options =
            QueryHelperOptions::for_model(&config, loader(&config), None, Some("small")).unwrap();

        assert_eq!(options.model, "small");
        assert_eq!(options.context_window_size, 128_000);
    }

    #[test]
    fn test_options_unknown_model() {
        let config = SummarizerConfig::parse(CONFIG).unwrap();
        let result = QueryHelperOptions::for_model(&config, loader(&config), None, Some("nope"));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
