use async_trait::async_trait;
use std::error::Error as StdError;
use log::{ debug, info };

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, ProviderError };
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key)
            .model(&chat_model)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }
        if let Some(tokens) = max_tokens {
            builder = builder.max_tokens(tokens);
        }
        if let Some(temp) = temperature {
            builder = builder.temperature(temp);
        }

        let llm_provider = builder.build()?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "Google API key is required for GeminiChatClient".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.max_tokens,
            config.temperature
        )
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        debug!(
            "GeminiChatClient::complete() → model={} base_url={:?}",
            self.model,
            self.base_url
        );
        let resp = self.llm
            .chat(&messages).await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        if text.trim().is_empty() {
            info!("GeminiChatClient::complete() → model={} returned no text", self.model);
            return Err(ProviderError::EmptyResponse);
        }
        Ok(CompletionResponse { response: text })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        self.base_url.clone()
    }
}
