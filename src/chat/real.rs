use crate::chat::{ChatClientTrait, ChatOptions, ChatStream};
use anyhow::{anyhow, Context, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;

// Chat client for any OpenAI-compatible chat completions endpoint
pub struct RealChatClient {
    client: Client<OpenAIConfig>,
}

impl RealChatClient {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

fn build_request(
    prompt: &str,
    options: &ChatOptions,
) -> Result<CreateChatCompletionRequest> {
    let user_message = ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .context("Failed to build user message")?,
    );

    CreateChatCompletionRequestArgs::default()
        .model(options.model.clone())
        .messages([user_message])
        .build()
        .context("Failed to build chat request")
}

#[async_trait]
impl ChatClientTrait for RealChatClient {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<String> {
        let request = build_request(prompt, options)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            anyhow!("Failed to create chat completion: {}", e)
        })?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("missing text content in chat response"))
    }

    async fn chat_stream(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChatStream> {
        let request = build_request(prompt, options)?;

        let stream =
            self.client.chat().create_stream(request).await.map_err(|e| {
                anyhow!("Failed to open chat completion stream: {}", e)
            })?;

        let chunks = stream.map(|event| -> Result<String> {
            let event =
                event.map_err(|e| anyhow!("Chat stream receive failed: {}", e))?;
            Ok(event
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect::<String>())
        });

        Ok(chunks.boxed())
    }
}

/// Builds a chat client when an API key is configured.
pub fn maybe_create_chat_client(
    api_key: Option<String>,
    api_base: Option<String>,
) -> Result<Arc<dyn ChatClientTrait>> {
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("Chat API key not configured"))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(api_base) = api_base {
        config = config.with_api_base(api_base);
    }

    Ok(Arc::new(RealChatClient::new(Client::with_config(config))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_an_error() {
        let result = maybe_create_chat_client(None, None);
        assert!(result.is_err());

        let result = maybe_create_chat_client(Some("  ".to_string()), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_created_with_key() {
        let client = maybe_create_chat_client(
            Some("test-key".to_string()),
            Some("http://localhost:9999/v1".to_string()),
        )
        .unwrap();
        assert!(client.is_available());
    }

    #[test]
    fn test_build_request_uses_model() {
        let options = ChatOptions {
            model: "claude-sonnet-4".to_string(),
            stream: false,
        };
        let request = build_request("hello", &options).unwrap();
        assert_eq!(request.model, "claude-sonnet-4");
        assert_eq!(request.messages.len(), 1);
    }
}
