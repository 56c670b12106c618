use crate::llm::client::{GenerationParams, LLMClient, LLMResponse, TokenUsage};
use crate::types::{AppError, ChatMessage, MessageRole, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    params: GenerationParams,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String, params: GenerationParams) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
            params,
        }
    }
}

fn to_request_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
    let content = message.content.clone();
    match message.role {
        MessageRole::System => ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage::from(content),
        ),
        MessageRole::User => {
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(content))
        }
        MessageRole::Assistant => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessage::from(content),
        ),
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_messages(&self, messages: &[ChatMessage]) -> Result<LLMResponse> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages.iter().map(to_request_message).collect::<Vec<_>>())
            .max_completion_tokens(u32::try_from(self.params.max_tokens).unwrap_or(u32::MAX))
            .temperature(self.params.temperature)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let choice = response
            .choices
            .first()
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        let content = choice
            .message
            .content
            .clone()
            .ok_or_else(|| AppError::LLM("OpenAI returned an empty message".to_string()))?;

        let finish_reason = choice
            .finish_reason
            .as_ref()
            .map(|r| format!("{:?}", r).to_lowercase())
            .unwrap_or_else(|| "stop".to_string());

        Ok(LLMResponse {
            content,
            finish_reason,
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
