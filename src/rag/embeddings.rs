use async_trait::async_trait;

use crate::types::Result;

/// Turns text into a dense vector for index lookups
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[cfg(feature = "ollama")]
pub use ollama_embedder::OllamaEmbedder;

#[cfg(feature = "ollama")]
mod ollama_embedder {
    use async_trait::async_trait;
    use ollama_rs::{
        Ollama,
        generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest},
    };

    use super::Embedder;
    use crate::llm::ollama::connect;
    use crate::types::{AppError, Result};

    /// Embeddings served by an Ollama model such as `nomic-embed-text`
    pub struct OllamaEmbedder {
        client: Ollama,
        model: String,
    }

    impl OllamaEmbedder {
        pub fn new(base_url: &str, model: impl Into<String>) -> Self {
            Self {
                client: connect(base_url),
                model: model.into(),
            }
        }

        pub fn model(&self) -> &str {
            &self.model
        }
    }

    #[async_trait]
    impl Embedder for OllamaEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let request = GenerateEmbeddingsRequest::new(
                self.model.clone(),
                EmbeddingsInput::Single(text.to_string()),
            );

            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| AppError::Index(format!("Ollama embeddings error: {}", e)))?;

            response.embeddings.into_iter().next().ok_or_else(|| {
                AppError::Index(format!("Model '{}' returned no embedding", self.model))
            })
        }
    }
}

/// Embedder for the `[reference_content]` section of the configuration
pub fn configured_embedder(
    config: &crate::utils::toml_config::SummarizerConfig,
) -> Result<Box<dyn Embedder>> {
    use crate::types::AppError;
    use crate::utils::toml_config::ProviderConfig;

    let reference = config.reference_content.as_ref().ok_or_else(|| {
        AppError::Configuration("No [reference_content] section configured".to_string())
    })?;

    let provider = config
        .get_provider(&reference.embeddings_provider)
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "Embeddings provider '{}' not found",
                reference.embeddings_provider
            ))
        })?;

    match provider {
        #[cfg(feature = "ollama")]
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaEmbedder::new(
            base_url,
            reference.embeddings_model.clone(),
        ))),
        #[allow(unreachable_patterns)]
        _ => Err(AppError::Configuration(format!(
            "Provider '{}' cannot serve embeddings in this build",
            reference.embeddings_provider
        ))),
    }
}
