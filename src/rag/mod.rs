//! Retrieval seams for the summarizer
//!
//! Retrieval, reranking and embedding are owned by external engines; this
//! module only defines the traits the summarizer talks to, plus adapters.
//!
//! # Module Structure
//!
//! - [`rag::index`](crate::rag::index) - [`DocsIndex`] trait for passage lookup
//! - [`rag::reranker`](crate::rag::reranker) - [`Reranker`] trait, passthrough and cross-encoder
//! - [`rag::embeddings`](crate::rag::embeddings) - [`Embedder`] trait and the Ollama embedder
//! - `rag::vector_index` - `ares-vector` backed [`DocsIndex`] (feature `ares-vector`)
//! - `rag::chunker` / `rag::ingest` - documentation ingestion (feature `ares-vector`)
//!
//! # Pipeline
//!
//! 1. **Ingestion** - Documents are chunked, embedded and stored with their URL and title
//! 2. **Retrieval** - The question is embedded and the closest passages returned
//! 3. **Reranking** - Passages are reordered by the configured [`Reranker`]
//! 4. **Packing** - The token handler keeps what fits the context window
//!
//! # Example
//!
//! ```ignore
//! use docs_summarizer::rag::{embeddings::OllamaEmbedder, vector_index::VectorDocsIndex};
//!
//! let embedder = OllamaEmbedder::new("http://localhost:11434", "nomic-embed-text");
//! let index = VectorDocsIndex::open(Some(path), "docs", Box::new(embedder)).await?;
//! let nodes = index.retrieve("How do I upgrade?", 5).await?;
//! ```

pub mod embeddings;
pub mod index;
pub mod reranker;

#[cfg(feature = "ares-vector")]
pub mod chunker;
#[cfg(feature = "ares-vector")]
pub mod ingest;
#[cfg(feature = "ares-vector")]
pub mod vector_index;

pub use embeddings::Embedder;
pub use index::DocsIndex;
pub use reranker::{PassthroughReranker, Reranker};
