//! Mock implementations for testing.
//!
//! This module provides mock LLM clients, loaders, indexes and rerankers that
//! can be used across different test files without duplication.

#![allow(dead_code)]

use async_trait::async_trait;
use docs_summarizer::llm::{GenerationParams, LLMClient, LLMLoader, LLMResponse, TokenUsage};
use docs_summarizer::rag::{DocsIndex, Reranker};
use docs_summarizer::types::{
    AppError, ChatMessage, DOCS_URL_KEY, Result, RetrievedNode, TITLE_KEY,
};
use parking_lot::Mutex;
use std::sync::Arc;

pub const DOCS_ROOT_URL: &str = "https://docs.example.com/product";
pub const DOCS_VERSION: &str = "4.15";

/// URL of the single passage returned by [`MockDocsIndex`]
pub fn test_doc_url() -> String {
    format!("{}/{}/docs/test.html", DOCS_ROOT_URL, DOCS_VERSION)
}

/// Mock LLM client that answers with the question it was asked.
///
/// The response always contains the final user message, so tests can check
/// that the question made it through prompt assembly. A fixed prefix can be
/// configured, or the client can be made to fail.
#[derive(Clone)]
pub struct MockLLMClient {
    prefix: String,
    should_fail: bool,
    transcripts: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockLLMClient {
    /// Create a mock client whose answers start with `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            should_fail: false,
            transcripts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Every transcript the client was sent, oldest first.
    pub fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
        self.transcripts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_messages(&self, messages: &[ChatMessage]) -> Result<LLMResponse> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        self.transcripts.lock().push(messages.to_vec());
        let question = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(LLMResponse {
            content: format!("{}{}", self.prefix, question),
            finish_reason: "stop".to_string(),
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock loader handing out clones of one [`MockLLMClient`].
#[derive(Clone)]
pub struct MockLLMLoader {
    client: MockLLMClient,
    loads: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockLLMLoader {
    pub fn new(client: MockLLMClient) -> Self {
        Self {
            client,
            loads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn client(&self) -> &MockLLMClient {
        &self.client
    }

    /// `(provider, model)` pairs requested so far.
    pub fn loads(&self) -> Vec<(String, String)> {
        self.loads.lock().clone()
    }
}

impl Default for MockLLMLoader {
    fn default() -> Self {
        Self::new(MockLLMClient::new(""))
    }
}

#[async_trait]
impl LLMLoader for MockLLMLoader {
    async fn load(
        &self,
        provider: &str,
        model: &str,
        _params: GenerationParams,
    ) -> Result<Box<dyn LLMClient>> {
        self.loads
            .lock()
            .push((provider.to_string(), model.to_string()));
        Ok(Box::new(self.client.clone()))
    }
}

/// Mock index returning one well-scored passage.
pub struct MockDocsIndex {
    nodes: Vec<RetrievedNode>,
}

impl MockDocsIndex {
    pub fn new() -> Self {
        Self {
            nodes: vec![RetrievedNode::new(
                "test-node",
                "Kubernetes is an open source container orchestration tool.",
                Some(0.9),
            )
            .with_metadata(DOCS_URL_KEY, test_doc_url())
            .with_metadata(TITLE_KEY, "Test document")],
        }
    }

    pub fn with_nodes(nodes: Vec<RetrievedNode>) -> Self {
        Self { nodes }
    }
}

impl Default for MockDocsIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocsIndex for MockDocsIndex {
    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedNode>> {
        Ok(self.nodes.iter().take(top_k).cloned().collect())
    }
}

/// Reranker that records call sizes and reverses the order it is given.
#[derive(Clone, Default)]
pub struct RecordingReranker {
    calls: Arc<Mutex<Vec<usize>>>,
}

impl RecordingReranker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes passed on each call.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Reranker for RecordingReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut nodes: Vec<RetrievedNode>,
    ) -> Result<Vec<RetrievedNode>> {
        self.calls.lock().push(nodes.len());
        nodes.reverse();
        Ok(nodes)
    }
}
