use crate::llm::client::{GenerationParams, LLMClient, LLMResponse, TokenUsage};
use crate::types::{AppError, ChatMessage as Message, MessageRole, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    models::ModelOptions,
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Split `scheme://host[:port]` into the pieces `ollama-rs` expects
pub(crate) fn parse_base_url(base_url: &str) -> (String, u16) {
    let (scheme, rest) = base_url.split_once("://").unwrap_or(("http", base_url));
    let rest = rest.trim_end_matches('/');

    match rest.rsplit_once(':') {
        Some((host, port)) => (
            format!("{}://{}", scheme, host),
            port.parse().unwrap_or(DEFAULT_OLLAMA_PORT),
        ),
        None => (format!("{}://{}", scheme, rest), DEFAULT_OLLAMA_PORT),
    }
}

pub(crate) fn connect(base_url: &str) -> Ollama {
    let (host, port) = parse_base_url(base_url);
    Ollama::new(host, port)
}

pub struct OllamaClient {
    client: Ollama,
    model: String,
    params: GenerationParams,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, params: GenerationParams) -> Result<Self> {
        if model.is_empty() {
            return Err(AppError::Configuration(
                "Ollama model name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: connect(&base_url),
            model,
            params,
        })
    }

    fn options(&self) -> ModelOptions {
        ModelOptions::default()
            .temperature(self.params.temperature)
            .num_predict(i32::try_from(self.params.max_tokens).unwrap_or(i32::MAX))
    }
}

fn to_ollama_message(message: &Message) -> ChatMessage {
    match message.role {
        MessageRole::System => ChatMessage::system(message.content.clone()),
        MessageRole::User => ChatMessage::user(message.content.clone()),
        MessageRole::Assistant => ChatMessage::assistant(message.content.clone()),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_messages(&self, messages: &[Message]) -> Result<LLMResponse> {
        let chat_messages: Vec<ChatMessage> = messages.iter().map(to_ollama_message).collect();

        let request =
            ChatMessageRequest::new(self.model.clone(), chat_messages).options(self.options());

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        let usage = response.final_data.as_ref().map(|data| TokenUsage {
            input_tokens: u32::try_from(data.prompt_eval_count).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(data.eval_count).unwrap_or(u32::MAX),
        });

        Ok(LLMResponse {
            content: response.message.content,
            finish_reason: "stop".to_string(),
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
