use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============= Chat Message Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name used by chat-completion style APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ============= RAG Types =============

/// Metadata key holding the public URL of the source document
pub const DOCS_URL_KEY: &str = "docs_url";
/// Metadata key holding the document title
pub const TITLE_KEY: &str = "title";

/// A passage returned by a [`DocsIndex`](crate::rag::index::DocsIndex) query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedNode {
    pub id: String,
    pub text: String,
    /// Similarity score, higher is better. Absent when the backend does not score.
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RetrievedNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: Option<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn doc_url(&self) -> &str {
        self.metadata
            .get(DOCS_URL_KEY)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn doc_title(&self) -> &str {
        self.metadata.get(TITLE_KEY).map(String::as_str).unwrap_or("")
    }
}

/// Reference to a passage that was actually injected into the prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagChunk {
    pub text: String,
    pub doc_url: String,
    pub doc_title: String,
}

/// Outcome of a single summarization call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerResponse {
    pub response: String,
    pub rag_chunks: Vec<RagChunk>,
    pub history_truncated: bool,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Prompt length {prompt_tokens} exceeds LLM available context window limit {limit} tokens"
    )]
    PromptTooLong { prompt_tokens: usize, limit: usize },

    #[error("Index error: {0}")]
    Index(String),

    #[error("Tokenizer error: {0}")]
    Token(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
