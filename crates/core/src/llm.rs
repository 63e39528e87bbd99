//! Streaming Chat Client
//!
//! The language-model collaborator behind a trait seam so the orchestrator
//! can be tested against a mock. The stream is lazy, finite and not
//! restartable; consumers concatenate the fragments into the final
//! assistant message.

use crate::error::ModelError;
use crate::state::{ChatMessage, MessageRole};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// A stream of assistant text fragments.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

/// A generic streaming client for chat completions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Starts a streaming completion for the given system prompt and
    /// conversation history (which already ends with the context for this
    /// turn).
    async fn stream_chat(
        &self,
        system_prompt: String,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatStream, ModelError>;
}

/// An implementation of [`ChatClient`] for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL for the service.
    /// * `model` - The model identifier to use for chat completions.
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAICompatibleClient {
    async fn stream_chat(
        &self,
        system_prompt: String,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatStream, ModelError> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(ModelError::Api)?
                .into(),
        ];
        for msg in &messages {
            let request_message = match msg.role {
                MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content.clone())
                    .build()
                    .map_err(ModelError::Api)?
                    .into(),
                MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(msg.content.clone())
                    .build()
                    .map_err(ModelError::Api)?
                    .into(),
            };
            request_messages.push(request_message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .stream(true)
            .build()
            .map_err(ModelError::Api)?;

        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.filter_map(|result| async {
            match result {
                Ok(response) => {
                    let content = response
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.as_deref());
                    match content {
                        Some(content) if !content.is_empty() => Some(Ok(content.to_string())),
                        _ => None,
                    }
                }
                Err(e) => Some(Err(ModelError::Api(e))),
            }
        })))
    }
}
