//! OpenAI implementation of [`LlmClient`]: prepends the tutor system message
//! and requests a single chat completion.

use std::sync::Arc;

use anyhow::Result;
use async_openai::{types::CreateChatCompletionRequestArgs, Client};
use async_trait::async_trait;
use prompt::ChatMessage;
use tracing::instrument;

use super::{chat_message_to_openai, LlmClient};

/// [`LlmClient`] backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    model: String,
    system_prompt: Option<String>,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
        }
    }

    /// Builds a client from an [`LlmConfig`](crate::LlmConfig) (key, base
    /// URL, model, optional system prompt).
    pub fn from_config(config: &dyn crate::LlmConfig) -> Self {
        let mut client =
            Self::with_base_url(config.api_key().to_string(), config.base_url().to_string())
                .with_model(config.model());
        if let Some(prompt) = config.system_prompt() {
            client = client.with_system_prompt(prompt);
        }
        client
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn system_content(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(prompt::DEFAULT_SYSTEM_MESSAGE)
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages))]
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let mut openai_messages = vec![async_openai::types::ChatCompletionRequestMessage::from(
            async_openai::types::ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_content().to_string())
                .build()?,
        )];
        for msg in &messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(openai_messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        if let Some(choice) = response.choices.first() {
            Ok(choice.message.content.clone().unwrap_or_default())
        } else {
            anyhow::bail!("No response from OpenAI")
        }
    }
}
