//! Embedded HNSW index backed by `ares-vector`.
//!
//! Each vector carries its passage text plus the document URL and title, so
//! a search result can be turned into a [`RetrievedNode`] without a second
//! document store.

use std::path::Path;

use ares_vector::{Config, DistanceMetric, VectorDb, VectorMetadata};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::rag::embeddings::Embedder;
use crate::rag::index::DocsIndex;
use crate::types::{AppError, DOCS_URL_KEY, Result, RetrievedNode, TITLE_KEY};

/// Metadata key holding the passage text
pub const TEXT_KEY: &str = "text";

pub struct VectorDocsIndex {
    db: VectorDb,
    collection: String,
    embedder: Box<dyn Embedder>,
}

impl VectorDocsIndex {
    /// Open an index; `None` keeps everything in memory
    pub async fn open(
        path: Option<&Path>,
        collection: impl Into<String>,
        embedder: Box<dyn Embedder>,
    ) -> Result<Self> {
        let config = match path {
            Some(p) => Config::persistent(p.to_path_buf()),
            None => Config::memory(),
        };

        let db = VectorDb::open(config)
            .await
            .map_err(|e| AppError::Index(format!("Failed to open vector index: {}", e)))?;

        Ok(Self {
            db,
            collection: collection.into(),
            embedder,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of stored passages, zero when the collection does not exist yet
    pub fn len(&self) -> Result<usize> {
        if !self.db.collection_exists(&self.collection) {
            return Ok(0);
        }
        self.db
            .count(&self.collection)
            .map_err(|e| AppError::Index(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether anything has been ingested into the collection yet
    pub fn has_collection(&self) -> bool {
        self.db.collection_exists(&self.collection)
    }

    /// Embed and store one passage, creating the collection on first insert
    pub async fn add_passage(&self, id: &str, text: &str, doc_url: &str, title: &str) -> Result<()> {
        let embedding = self.embedder.embed(text).await?;

        if !self.db.collection_exists(&self.collection) {
            info!(collection = %self.collection, dimensions = embedding.len(), "Creating collection");
            self.db
                .create_collection(&self.collection, embedding.len(), DistanceMetric::Cosine)
                .await
                .map_err(|e| AppError::Index(format!("Failed to create collection: {}", e)))?;
        }

        let metadata = VectorMetadata::from_pairs([
            (TEXT_KEY, text),
            (DOCS_URL_KEY, doc_url),
            (TITLE_KEY, title),
        ]);

        self.db
            .insert(&self.collection, id, &embedding, Some(metadata))
            .await
            .map_err(|e| AppError::Index(format!("Failed to insert passage '{}': {}", id, e)))
    }

    /// Remove one passage; `false` when it was not stored
    pub async fn remove_passage(&self, id: &str) -> Result<bool> {
        if !self.has_collection() {
            return Ok(false);
        }
        self.db
            .delete(&self.collection, id)
            .await
            .map_err(|e| AppError::Index(format!("Failed to delete passage '{}': {}", id, e)))
    }

    /// Flush to disk; a no-op for in-memory indexes
    pub async fn persist(&self) -> Result<()> {
        self.db
            .persist()
            .await
            .map_err(|e| AppError::Index(format!("Failed to persist index: {}", e)))
    }
}

#[async_trait]
impl DocsIndex for VectorDocsIndex {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedNode>> {
        if !self.has_collection() {
            return Err(AppError::Index(format!(
                "Collection '{}' does not exist; run `docs-summarizer index` first",
                self.collection
            )));
        }

        let embedding = self.embedder.embed(query).await?;
        let results = self
            .db
            .search(&self.collection, &embedding, top_k)
            .await
            .map_err(|e| AppError::Index(format!("Search failed: {}", e)))?;

        debug!(count = results.len(), "Retrieved passages");

        Ok(results
            .into_iter()
            .map(|result| {
                let mut node = RetrievedNode::new(result.id, "", Some(result.score));
                if let Some(meta) = result.metadata {
                    for key in [DOCS_URL_KEY, TITLE_KEY] {
                        if let Some(value) = meta.get_string(key) {
                            node = node.with_metadata(key, value);
                        }
                    }
                    node.text = meta.get_string(TEXT_KEY).unwrap_or_default().to_string();
                }
                node
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic embedder: counts of a few marker words
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(["install", "upgrade", "network"]
                .iter()
                .map(|w| text.matches(w).count() as f32 + 0.01)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_retrieve_before_ingest_fails() {
        let index = VectorDocsIndex::open(None, "docs", Box::new(KeywordEmbedder))
            .await
            .unwrap();

        let err = index.retrieve("install", 3).await.unwrap_err();
        assert!(matches!(err, AppError::Index(_)));
    }

    #[tokio::test]
    async fn test_add_and_retrieve_carries_metadata() {
        let index = VectorDocsIndex::open(None, "docs", Box::new(KeywordEmbedder))
            .await
            .unwrap();

        index
            .add_passage(
                "install-0",
                "How to install the operator. Install it twice.",
                "https://docs.example.com/install.html",
                "Installing",
            )
            .await
            .unwrap();
        index
            .add_passage(
                "network-0",
                "Network policies isolate network traffic.",
                "https://docs.example.com/network.html",
                "Networking",
            )
            .await
            .unwrap();

        assert_eq!(index.len().unwrap(), 2);

        let nodes = index.retrieve("install", 1).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].doc_url(), "https://docs.example.com/install.html");
        assert_eq!(nodes[0].doc_title(), "Installing");
        assert!(nodes[0].text.contains("install the operator"));
        assert!(nodes[0].score.is_some());
    }

    #[tokio::test]
    async fn test_fresh_persistent_index_has_no_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");

        let index = VectorDocsIndex::open(Some(&path), "docs", Box::new(KeywordEmbedder))
            .await
            .unwrap();

        assert!(!index.has_collection());
        assert!(index.is_empty().unwrap());
        assert!(index.retrieve("install", 3).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_passage() {
        let index = VectorDocsIndex::open(None, "docs", Box::new(KeywordEmbedder))
            .await
            .unwrap();
        assert!(!index.has_collection());
        assert!(!index.remove_passage("install-0").await.unwrap());

        index
            .add_passage("install-0", "Install it.", "https://docs.example.com/a.html", "A")
            .await
            .unwrap();
        assert!(index.has_collection());

        assert!(index.remove_passage("install-0").await.unwrap());
        assert!(!index.remove_passage("install-0").await.unwrap());
        assert!(index.is_empty().unwrap());
    }
}
