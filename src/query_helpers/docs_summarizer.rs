//! Documentation summarizer.
//!
//! Answers a question from retrieved documentation passages and the
//! conversation history, keeping both inside the model's context window.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::prompts::PromptBuilder;
use crate::query_helpers::{QueryHelper, QueryHelperOptions};
use crate::rag::{DocsIndex, PassthroughReranker, Reranker};
use crate::types::{Result, SummarizerResponse};
use crate::utils::token_handler::{TokenBudget, TokenHandler};

/// Stand-in passage and history line used to reserve room for the
/// instructions they pull into the system message
const SAMPLE_CONTEXT: &str = "sample";
const SAMPLE_HISTORY: &str = "ai: sample";

pub struct DocsSummarizer {
    options: QueryHelperOptions,
    reranker: Arc<dyn Reranker>,
    token_budget: Arc<dyn TokenBudget>,
}

impl DocsSummarizer {
    /// Summarizer with a passthrough reranker and a `cl100k_base` token handler
    pub fn new(options: QueryHelperOptions) -> Result<Self> {
        let token_budget = TokenHandler::new(options.rag.token_limits())?;
        Ok(Self {
            options,
            reranker: Arc::new(PassthroughReranker),
            token_budget: Arc::new(token_budget),
        })
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn with_token_budget(mut self, token_budget: Arc<dyn TokenBudget>) -> Self {
        self.token_budget = token_budget;
        self
    }

    /// Answer `query`, optionally grounded in `index` and continuing `history`
    ///
    /// History entries are `human: ...` / `ai: ...` lines, oldest first. The
    /// oldest entries are dropped when they do not fit; `history_truncated`
    /// reports whether that happened.
    pub async fn summarize(
        &self,
        conversation_id: &str,
        query: &str,
        index: Option<&dyn DocsIndex>,
        history: Option<&[String]>,
    ) -> Result<SummarizerResponse> {
        debug!("{} call summarize", conversation_id);

        let llm = self
            .options
            .llm_loader
            .load(&self.options.provider, &self.options.model, self.options.params)
            .await?;

        let sample_context = [SAMPLE_CONTEXT.to_string()];
        let sample_history = [SAMPLE_HISTORY.to_string()];
        let bare_prompt = PromptBuilder::new(query, &self.options.system_prompt)
            .with_rag_context(&sample_context)
            .with_history(&sample_history)
            .render();

        let mut available_tokens = self.token_budget.calculate_and_check_available_tokens(
            &bare_prompt,
            self.options.context_window_size,
            self.options.params.max_tokens,
        )?;

        let rag_chunks = match index {
            Some(index) => {
                let nodes = index.retrieve(query, self.options.rag.top_k).await?;
                let nodes = self.reranker.rerank(query, nodes).await?;
                let (chunks, remaining) = self
                    .token_budget
                    .truncate_rag_context(&nodes, available_tokens)?;
                available_tokens = remaining;
                chunks
            }
            None => {
                warn!("Proceeding without RAG content");
                Vec::new()
            }
        };

        let (history, history_truncated) = self
            .token_budget
            .limit_conversation_history(history.unwrap_or(&[]), available_tokens);

        let rag_context: Vec<String> = rag_chunks.iter().map(|c| c.text.clone()).collect();
        let messages = PromptBuilder::new(query, &self.options.system_prompt)
            .with_rag_context(&rag_context)
            .with_history(&history)
            .messages();

        let response = llm.generate_with_messages(&messages).await?;

        if rag_chunks.is_empty() {
            debug!("Using llm to answer the query without reference content");
        }
        debug!("{} Summary response: {}", conversation_id, response.content);

        Ok(SummarizerResponse {
            response: response.content,
            rag_chunks,
            history_truncated,
        })
    }
}

impl QueryHelper for DocsSummarizer {
    fn options(&self) -> &QueryHelperOptions {
        &self.options
    }
}
