use async_trait::async_trait;

use crate::types::{Result, RetrievedNode};

/// Source of reference passages for a question
///
/// Implementations return nodes ordered by descending score. The summarizer
/// relies on that ordering when it stops at the first passage below the
/// similarity cutoff.
#[async_trait]
pub trait DocsIndex: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedNode>>;
}
