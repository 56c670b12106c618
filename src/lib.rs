//! # docs-summarizer
//!
//! Retrieval-augmented question answering over product documentation.
//!
//! A question is answered by retrieving documentation passages, reranking
//! them, packing as many as fit into the model's context window together with
//! the newest conversation history, and asking the configured LLM.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use docs_summarizer::{
//!     ConfigBasedLLMLoader, DocsSummarizer, QueryHelperOptions, SummarizerConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizerConfig::load("docs-summarizer.toml")?;
//!     let loader = Arc::new(ConfigBasedLLMLoader::from_config(config.clone()));
//!     let summarizer = DocsSummarizer::new(QueryHelperOptions::from_config(&config, loader)?)?;
//!
//!     let summary = summarizer
//!         .summarize("conversation-1", "How do I upgrade?", None, None)
//!         .await?;
//!     println!("{}", summary.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama chat and embeddings (default) |
//! | `openai` | OpenAI-compatible chat completions |
//! | `ares-vector` | Embedded HNSW index and documentation ingestion (default) |
//! | `cross-encoder` | fastembed cross-encoder reranker |
//!
//! ## Modules
//!
//! - [`query_helpers`] - [`DocsSummarizer`] and the [`QueryHelper`] trait
//! - [`llm`] - LLM client trait and providers
//! - [`rag`] - Index, reranker and embedder seams
//! - [`prompts`] - Prompt templates and assembly
//! - [`utils`] - Token budget, configuration, logging, ids
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command line parsing and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Prompt templates and assembly.
pub mod prompts;
/// Question answering components built on an LLM.
pub mod query_helpers;
/// Retrieval Augmented Generation (RAG) seams and adapters.
pub mod rag;
/// Core types (messages, passages, errors).
pub mod types;
/// Token budget, configuration, logging and id helpers.
pub mod utils;

// Re-export commonly used types
pub use llm::{ConfigBasedLLMLoader, LLMClient, LLMLoader, LLMResponse, Provider};
pub use query_helpers::{DocsSummarizer, QueryHelper, QueryHelperOptions};
pub use rag::{DocsIndex, PassthroughReranker, Reranker};
pub use types::{AppError, RagChunk, Result, RetrievedNode, SummarizerResponse};
pub use utils::token_handler::{TokenBudget, TokenHandler};
pub use utils::toml_config::{SummarizerConfig, SummarizerConfigManager};
