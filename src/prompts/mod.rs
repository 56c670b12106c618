//! Prompt templates and assembly.
//!
//! The summarizer always sends a single system message first, then the
//! (already truncated) conversation history, then the user question. Retrieved
//! passages are folded into the system message.

use crate::types::{ChatMessage, MessageRole};

/// System prompt used when the configuration does not override it
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a documentation assistant, an intelligent \
assistant for question-answering tasks about the product documentation you are given. \
Answer questions precisely and concisely. If you do not know the answer, say so; do not \
make one up. Refuse to answer questions that are unrelated to the documentation.";

/// Appended to the system prompt when retrieved passages are present
pub const USE_CONTEXT_INSTRUCTION: &str = "Use the retrieved document to answer the question.";

/// Appended to the system prompt when conversation history is present
pub const USE_HISTORY_INSTRUCTION: &str =
    "Use the previous chat history to interact and help the user.";

/// One line of stored conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

impl<'a> HistoryEntry<'a> {
    /// Parse `human: ...` / `ai: ...` lines. Anything else is treated as user text, unchanged.
    pub fn parse(line: &'a str) -> Self {
        if let Some(rest) = line.strip_prefix("human:") {
            Self {
                role: MessageRole::User,
                content: rest.trim_start(),
            }
        } else if let Some(rest) = line.strip_prefix("ai:") {
            Self {
                role: MessageRole::Assistant,
                content: rest.trim_start(),
            }
        } else {
            Self {
                role: MessageRole::User,
                content: line,
            }
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.to_string(),
        }
    }
}

/// Render a retrieved passage the way it appears in the prompt
pub fn format_document(text: &str) -> String {
    format!("Document:\n{}", text)
}

/// Builds the chat messages sent to the LLM
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    query: &'a str,
    system_prompt: &'a str,
    rag_context: &'a [String],
    history: &'a [String],
}

impl<'a> PromptBuilder<'a> {
    pub fn new(query: &'a str, system_prompt: &'a str) -> Self {
        Self {
            query,
            system_prompt,
            rag_context: &[],
            history: &[],
        }
    }

    pub fn with_rag_context(mut self, rag_context: &'a [String]) -> Self {
        self.rag_context = rag_context;
        self
    }

    pub fn with_history(mut self, history: &'a [String]) -> Self {
        self.history = history;
        self
    }

    fn system_message(&self) -> String {
        let mut system = self.system_prompt.to_string();

        if !self.rag_context.is_empty() {
            let documents: Vec<String> = self
                .rag_context
                .iter()
                .map(|text| format_document(text))
                .collect();
            system.push('\n');
            system.push_str(USE_CONTEXT_INSTRUCTION);
            system.push_str("\n\n");
            system.push_str(&documents.join("\n\n"));
        }

        if !self.history.is_empty() {
            system.push('\n');
            system.push_str(USE_HISTORY_INSTRUCTION);
        }

        system
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system_message()));
        messages.extend(
            self.history
                .iter()
                .map(|line| HistoryEntry::parse(line).to_message()),
        );
        messages.push(ChatMessage::user(self.query));
        messages
    }

    /// Plain text rendering, used for token accounting
    pub fn render(&self) -> String {
        self.messages()
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
