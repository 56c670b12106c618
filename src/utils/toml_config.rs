//! TOML-based configuration for the docs summarizer
//!
//! This module provides declarative configuration for providers, models, the
//! retrieval budget and the reference-content index via a TOML file
//! (`docs-summarizer.toml`).
//!
//! Relative paths in the file are resolved against the file's directory.
//! `SummarizerConfigManager` hands out lock-free snapshots and swaps in a new
//! one on `reload()`.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use crate::utils::logging::LoggingConfig;
use crate::utils::token_handler::{
    DEFAULT_MINIMUM_CONTEXT_TOKEN_LIMIT, DEFAULT_RAG_SIMILARITY_CUTOFF, TokenBudgetLimits,
};

/// Root configuration structure loaded from docs-summarizer.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub summarizer: SummarizerSection,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named LLM provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,

    /// Documentation index used for retrieval (optional)
    pub reference_content: Option<ReferenceContentConfig>,
}

// ============= Summarizer Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerSection {
    /// Provider used when a query helper is built without an explicit one
    pub default_provider: String,

    /// Model used when a query helper is built without an explicit one
    pub default_model: String,

    /// Inline system prompt override
    pub system_prompt: Option<String>,

    /// File containing the system prompt; takes precedence over `system_prompt`
    pub system_prompt_path: Option<PathBuf>,

    #[serde(default)]
    pub rag: RagConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Number of passages requested from the index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Passages scoring below this are dropped
    #[serde(default = "default_similarity_cutoff")]
    pub similarity_cutoff: f32,

    /// Passages that would fit in fewer tokens than this are dropped
    #[serde(default = "default_minimum_context_tokens")]
    pub minimum_context_tokens: usize,
}

fn default_top_k() -> usize {
    5
}

fn default_similarity_cutoff() -> f32 {
    DEFAULT_RAG_SIMILARITY_CUTOFF
}

fn default_minimum_context_tokens() -> usize {
    DEFAULT_MINIMUM_CONTEXT_TOKEN_LIMIT
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_cutoff: default_similarity_cutoff(),
            minimum_context_tokens: default_minimum_context_tokens(),
        }
    }
}

impl RagConfig {
    pub fn token_limits(&self) -> TokenBudgetLimits {
        TokenBudgetLimits {
            similarity_cutoff: self.similarity_cutoff,
            minimum_context_tokens: self.minimum_context_tokens,
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider
    pub model: String,

    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,

    #[serde(default = "default_max_tokens_for_response")]
    pub max_tokens_for_response: usize,

    #[serde(default)]
    pub temperature: f32,
}

fn default_context_window_size() -> usize {
    128_000
}

fn default_max_tokens_for_response() -> usize {
    512
}

// ============= Reference Content Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceContentConfig {
    /// Directory of the persisted vector index
    pub index_path: PathBuf,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Provider (from [providers]) serving the embedding model
    pub embeddings_provider: String,

    pub embeddings_model: String,
}

fn default_collection() -> String {
    "docs".to_string()
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by '{1}' does not exist")]
    MissingModel(String, String),
}

impl SummarizerConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse_relative_to(&content, base_dir)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// Relative paths stay relative to the working directory.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::parse_relative_to(content, Path::new(""))
    }

    /// Parse configuration whose relative paths are anchored at `base_dir`
    pub fn parse_relative_to(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: SummarizerConfig = toml::from_str(content)?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(path) = self.summarizer.system_prompt_path.as_mut() {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        if let Some(reference) = self.reference_content.as_mut() {
            if reference.index_path.is_relative() {
                reference.index_path = base_dir.join(&reference.index_path);
            }
        }
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, provider) in &self.providers {
            if let ProviderConfig::OpenAI { api_key_env, .. } = provider {
                self.validate_env_var(api_key_env).map_err(|e| {
                    ConfigError::ValidationError(format!("provider '{}': {}", name, e))
                })?;
            }
        }

        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    format!("model '{}'", model_name),
                ));
            }

            if model_config.max_tokens_for_response >= model_config.context_window_size {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': max_tokens_for_response ({}) must be smaller than context_window_size ({})",
                    model_name,
                    model_config.max_tokens_for_response,
                    model_config.context_window_size
                )));
            }
        }

        let section = &self.summarizer;
        if !self.providers.contains_key(&section.default_provider) {
            return Err(ConfigError::MissingProvider(
                section.default_provider.clone(),
                "summarizer.default_provider".to_string(),
            ));
        }

        let default_model = self.models.get(&section.default_model).ok_or_else(|| {
            ConfigError::MissingModel(
                section.default_model.clone(),
                "summarizer.default_model".to_string(),
            )
        })?;

        if default_model.provider != section.default_provider {
            return Err(ConfigError::ValidationError(format!(
                "default model '{}' is served by provider '{}', not default provider '{}'",
                section.default_model, default_model.provider, section.default_provider
            )));
        }

        if !(0.0..=1.0).contains(&section.rag.similarity_cutoff) {
            return Err(ConfigError::ValidationError(format!(
                "rag.similarity_cutoff must be within [0, 1], got {}",
                section.rag.similarity_cutoff
            )));
        }

        if section.rag.minimum_context_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "rag.minimum_context_tokens must be at least 1".to_string(),
            ));
        }

        if let Some(ref path) = section.system_prompt_path {
            if !path.exists() {
                return Err(ConfigError::ValidationError(format!(
                    "system prompt file does not exist: {}",
                    path.display()
                )));
            }
        }

        if let Some(ref reference) = self.reference_content {
            if !self.providers.contains_key(&reference.embeddings_provider) {
                return Err(ConfigError::MissingProvider(
                    reference.embeddings_provider.clone(),
                    "reference_content".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get model by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Resolve the effective system prompt: file, then inline text, then the built-in default
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        if let Some(ref path) = self.summarizer.system_prompt_path {
            let prompt = fs::read_to_string(path)?;
            return Ok(prompt.trim_end().to_string());
        }

        Ok(self
            .summarizer
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()))
    }
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Configuration(err.to_string())
    }
}

// ============= Configuration Manager =============

/// Thread-safe holder of the current configuration snapshot
#[derive(Clone)]
pub struct SummarizerConfigManager {
    config: Arc<ArcSwap<SummarizerConfig>>,
    config_path: PathBuf,
}

impl SummarizerConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = SummarizerConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    pub fn from_config(config: SummarizerConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<SummarizerConfig> {
        self.config.load_full()
    }

    /// Path of the backing configuration file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the configuration from disk
    ///
    /// A file that fails to load or validate leaves the previous snapshot in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = SummarizerConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }
}
