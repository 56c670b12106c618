//! Token accounting for prompt assembly.
//!
//! Counts are taken with the `cl100k_base` BPE and inflated by
//! [`TOKEN_BUFFER_PERCENT`], since the serving model's tokenizer is usually
//! not the one we count with.

use std::sync::{Arc, OnceLock};

use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::types::{AppError, RagChunk, Result, RetrievedNode};

/// Measured counts are scaled to this percentage, rounding up
pub const TOKEN_BUFFER_PERCENT: usize = 110;

/// Passages scoring below this are not used as context
pub const DEFAULT_RAG_SIMILARITY_CUTOFF: f32 = 0.3;

/// Passages that would get fewer tokens than this are not used as context
pub const DEFAULT_MINIMUM_CONTEXT_TOKEN_LIMIT: usize = 1;

/// Token id produced by the BPE
pub type Token = u32;

/// Thresholds applied while packing retrieved passages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBudgetLimits {
    pub similarity_cutoff: f32,
    pub minimum_context_tokens: usize,
}

impl Default for TokenBudgetLimits {
    fn default() -> Self {
        Self {
            similarity_cutoff: DEFAULT_RAG_SIMILARITY_CUTOFF,
            minimum_context_tokens: DEFAULT_MINIMUM_CONTEXT_TOKEN_LIMIT,
        }
    }
}

/// Budget operations the summarizer depends on
pub trait TokenBudget: Send + Sync {
    /// Tokens left for context and history once the bare prompt and the
    /// response reservation are accounted for
    fn calculate_and_check_available_tokens(
        &self,
        prompt: &str,
        context_window_size: usize,
        max_tokens_for_response: usize,
    ) -> Result<usize>;

    /// Pack passages into at most `max_tokens`; returns the chunks and the unused budget
    fn truncate_rag_context(
        &self,
        nodes: &[RetrievedNode],
        max_tokens: usize,
    ) -> Result<(Vec<RagChunk>, usize)>;

    /// Keep the newest history entries that fit in `limit`; the flag reports truncation
    fn limit_conversation_history(&self, history: &[String], limit: usize) -> (Vec<String>, bool);
}

fn shared_bpe() -> Result<Arc<CoreBPE>> {
    static BPE: OnceLock<Arc<CoreBPE>> = OnceLock::new();

    if let Some(bpe) = BPE.get() {
        return Ok(Arc::clone(bpe));
    }

    let bpe = tiktoken_rs::cl100k_base()
        .map_err(|e| AppError::Token(format!("Failed to load cl100k_base: {}", e)))?;
    Ok(Arc::clone(BPE.get_or_init(|| Arc::new(bpe))))
}

/// `cl100k_base` backed implementation of [`TokenBudget`]
#[derive(Clone)]
pub struct TokenHandler {
    bpe: Arc<CoreBPE>,
    limits: TokenBudgetLimits,
}

impl std::fmt::Debug for TokenHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHandler")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl TokenHandler {
    pub fn new(limits: TokenBudgetLimits) -> Result<Self> {
        Ok(Self {
            bpe: shared_bpe()?,
            limits,
        })
    }

    pub fn with_default_limits() -> Result<Self> {
        Self::new(TokenBudgetLimits::default())
    }

    pub fn limits(&self) -> TokenBudgetLimits {
        self.limits
    }

    pub fn text_to_tokens(&self, text: &str) -> Vec<Token> {
        self.bpe.encode_with_special_tokens(text)
    }

    pub fn tokens_to_text(&self, tokens: &[Token]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| AppError::Token(format!("Failed to decode tokens: {}", e)))
    }

    /// Decode a token prefix that may end inside a multi-byte character.
    ///
    /// Incomplete UTF-8 sequences become U+FFFD instead of failing.
    pub fn tokens_to_text_lossy(&self, tokens: &[Token]) -> String {
        let bytes: Vec<u8> = self
            .bpe
            ._decode_native_and_split(tokens.to_vec())
            .flatten()
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Buffered count for an already tokenized text
    pub fn token_count(tokens: &[Token]) -> usize {
        (tokens.len() * TOKEN_BUFFER_PERCENT).div_ceil(100)
    }

    /// Buffered count for raw text
    pub fn count_text(&self, text: &str) -> usize {
        Self::token_count(&self.text_to_tokens(text))
    }
}

impl TokenBudget for TokenHandler {
    fn calculate_and_check_available_tokens(
        &self,
        prompt: &str,
        context_window_size: usize,
        max_tokens_for_response: usize,
    ) -> Result<usize> {
        let prompt_tokens = self.count_text(prompt);
        let limit = context_window_size.saturating_sub(max_tokens_for_response);

        if prompt_tokens > limit {
            return Err(AppError::PromptTooLong {
                prompt_tokens,
                limit,
            });
        }

        let available = limit - prompt_tokens;
        debug!(prompt_tokens, available, "Computed available context tokens");
        Ok(available)
    }

    fn truncate_rag_context(
        &self,
        nodes: &[RetrievedNode],
        mut max_tokens: usize,
    ) -> Result<(Vec<RagChunk>, usize)> {
        let mut chunks = Vec::new();
        // a zero minimum would otherwise admit empty chunks once the budget is spent
        let minimum = self.limits.minimum_context_tokens.max(1);

        for node in nodes {
            let score = node.score.unwrap_or(0.0);
            if score < self.limits.similarity_cutoff {
                debug!(
                    "RAG content similarity score: {} is less than threshold {}.",
                    score, self.limits.similarity_cutoff
                );
                break;
            }

            let tokens = self.text_to_tokens(&node.text);
            let tokens_count = Self::token_count(&tokens);
            debug!("RAG content tokens count: {}.", tokens_count);

            let available = tokens_count.min(max_tokens);
            debug!("Available tokens: {}.", available);

            if available < minimum {
                debug!("{} tokens are less than threshold {}.", available, minimum);
                break;
            }

            let text = self.tokens_to_text_lossy(&tokens[..available.min(tokens.len())]);
            chunks.push(RagChunk {
                text,
                doc_url: node.doc_url().to_string(),
                doc_title: node.doc_title().to_string(),
            });
            max_tokens -= available;
        }

        Ok((chunks, max_tokens))
    }

    fn limit_conversation_history(&self, history: &[String], limit: usize) -> (Vec<String>, bool) {
        let mut total_length = 0;

        for (index, message) in history.iter().rev().enumerate() {
            total_length += self.count_text(message);

            if total_length > limit {
                debug!("History truncated, it exceeds available {} tokens.", limit);
                return (history[history.len() - index..].to_vec(), true);
            }
        }

        (history.to_vec(), false)
    }
}
