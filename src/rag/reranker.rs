//! Reranking of retrieved passages.
//!
//! The summarizer always routes retrieval results through a [`Reranker`].
//! [`PassthroughReranker`] keeps the index order; with the `cross-encoder`
//! feature, [`CrossEncoderReranker`] rescores passages with a fastembed
//! cross-encoder model.

use async_trait::async_trait;
use tracing::debug;

use crate::types::{Result, RetrievedNode};

/// Reorders passages by relevance to the query
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, query: &str, nodes: Vec<RetrievedNode>) -> Result<Vec<RetrievedNode>>;
}

/// Reranker that only records the call
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughReranker;

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(&self, _query: &str, nodes: Vec<RetrievedNode>) -> Result<Vec<RetrievedNode>> {
        debug!("reranker.rerank() is called with {} result(s).", nodes.len());
        Ok(nodes)
    }
}

#[cfg(feature = "cross-encoder")]
pub use cross_encoder::{CrossEncoderReranker, RerankerConfig, RerankerModelType};

#[cfg(feature = "cross-encoder")]
mod cross_encoder {
    use std::cmp::Ordering;
    use std::str::FromStr;
    use std::sync::Arc;

    use async_trait::async_trait;
    use fastembed::{RerankInitOptions, RerankerModel as FastEmbedRerankerModel, TextRerank};
    use serde::{Deserialize, Serialize};
    use tokio::sync::OnceCell;
    use tracing::debug;

    use super::Reranker;
    use crate::types::{AppError, Result, RetrievedNode};

    // ============================================================================
    // Reranker Model Types
    // ============================================================================

    /// Cross-encoder models available through fastembed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    #[serde(rename_all = "kebab-case")]
    pub enum RerankerModelType {
        /// English/Chinese, good balance of speed and quality
        #[default]
        BgeRerankerBase,
        BgeRerankerV2M3,
        JinaRerankerV1TurboEn,
        JinaRerankerV2BaseMultilingual,
    }

    impl RerankerModelType {
        fn to_fastembed_model(self) -> FastEmbedRerankerModel {
            match self {
                Self::BgeRerankerBase => FastEmbedRerankerModel::BGERerankerBase,
                Self::BgeRerankerV2M3 => FastEmbedRerankerModel::BGERerankerV2M3,
                Self::JinaRerankerV1TurboEn => FastEmbedRerankerModel::JINARerankerV1TurboEn,
                // fastembed spells it "Multiligual"
                Self::JinaRerankerV2BaseMultilingual => {
                    FastEmbedRerankerModel::JINARerankerV2BaseMultiligual
                }
            }
        }
    }

    impl FromStr for RerankerModelType {
        type Err = AppError;

        fn from_str(s: &str) -> Result<Self> {
            match s.to_lowercase().as_str() {
                "bge-reranker-base" | "bge-base" => Ok(Self::BgeRerankerBase),
                "bge-reranker-v2-m3" | "bge-m3" => Ok(Self::BgeRerankerV2M3),
                "jina-reranker-v1-turbo-en" | "jina-turbo" => Ok(Self::JinaRerankerV1TurboEn),
                "jina-reranker-v2-base-multilingual" | "jina-multilingual" => {
                    Ok(Self::JinaRerankerV2BaseMultilingual)
                }
                _ => Err(AppError::Configuration(format!(
                    "Unknown reranker model: {}",
                    s
                ))),
            }
        }
    }

    /// Settings for [`CrossEncoderReranker`]
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RerankerConfig {
        #[serde(default)]
        pub model: RerankerModelType,
        #[serde(default)]
        pub show_download_progress: bool,
    }

    impl Default for RerankerConfig {
        fn default() -> Self {
            Self {
                model: RerankerModelType::default(),
                show_download_progress: false,
            }
        }
    }

    // ============================================================================
    // Cross-encoder Reranker
    // ============================================================================

    /// Rescores passages with a cross-encoder; the model loads on first use
    pub struct CrossEncoderReranker {
        config: RerankerConfig,
        model: OnceCell<Arc<tokio::sync::Mutex<TextRerank>>>,
    }

    impl CrossEncoderReranker {
        pub fn new(config: RerankerConfig) -> Self {
            Self {
                config,
                model: OnceCell::new(),
            }
        }

        async fn get_model(&self) -> Result<Arc<tokio::sync::Mutex<TextRerank>>> {
            self.model
                .get_or_try_init(|| async {
                    let config = self.config.clone();
                    tokio::task::spawn_blocking(move || {
                        let options = RerankInitOptions::new(config.model.to_fastembed_model())
                            .with_show_download_progress(config.show_download_progress);
                        let model = TextRerank::try_new(options).map_err(|e| {
                            AppError::Internal(format!("Failed to load reranker: {}", e))
                        })?;
                        Ok(Arc::new(tokio::sync::Mutex::new(model)))
                    })
                    .await
                    .map_err(|e| AppError::Internal(format!("Reranker task failed: {}", e)))?
                })
                .await
                .map(Arc::clone)
        }
    }

    #[async_trait]
    impl Reranker for CrossEncoderReranker {
        async fn rerank(
            &self,
            query: &str,
            nodes: Vec<RetrievedNode>,
        ) -> Result<Vec<RetrievedNode>> {
            debug!("reranker.rerank() is called with {} result(s).", nodes.len());
            if nodes.is_empty() {
                return Ok(nodes);
            }

            let model = self.get_model().await?;
            let documents: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
            let query = query.to_string();

            let scores = tokio::task::spawn_blocking(move || {
                let mut model = model.blocking_lock();
                model.rerank(query, &documents, false, None)
            })
            .await
            .map_err(|e| AppError::Internal(format!("Rerank task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Reranking failed: {}", e)))?;

            let mut reranked: Vec<RetrievedNode> = nodes
                .into_iter()
                .enumerate()
                .map(|(idx, mut node)| {
                    node.score = scores.iter().find(|r| r.index == idx).map(|r| r.score);
                    node
                })
                .collect();

            reranked.sort_by(|a, b| {
                b.score
                    .unwrap_or(f32::MIN)
                    .partial_cmp(&a.score.unwrap_or(f32::MIN))
                    .unwrap_or(Ordering::Equal)
            });

            Ok(reranked)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_reranker_model_from_str() {
            assert_eq!(
                "bge-m3".parse::<RerankerModelType>().unwrap(),
                RerankerModelType::BgeRerankerV2M3
            );
            assert!("nope".parse::<RerankerModelType>().is_err());
        }
    }
}
