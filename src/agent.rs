use crate::cli::Args;
use crate::llm::{ LlmConfig, LlmType, ProviderError };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };

use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Produces bot replies for user text through the configured chat provider.
///
/// Every call is bounded by `timeout`; an expired call is reported as
/// [`ProviderError::Timeout`].
#[derive(Clone)]
pub struct ReplyGenerator {
    chat_client: Arc<dyn ChatClient>,
    timeout: Duration,
}

impl ReplyGenerator {
    pub fn new(chat_client: Arc<dyn ChatClient>, timeout: Duration) -> Self {
        Self { chat_client, timeout }
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_llm_type: LlmType = args.chat_llm_type
            .parse()
            .map_err(|e| format!("Invalid chat LLM type: {}", e))?;
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            max_tokens: Some(args.max_output_tokens),
            temperature: Some(args.temperature),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={:?}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );

        Ok(Self::new(chat_client, Duration::from_secs(args.generation_timeout_secs)))
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.chat_client.complete(prompt)).await {
            Ok(result) => result.map(|completion| completion.response),
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::MockChatClient;

    #[tokio::test]
    async fn returns_provider_text() {
        let client = Arc::new(MockChatClient::new());
        client.queue_reply("a random fact");
        let generator = testing::generator(client.clone());

        assert_eq!(generator.generate("tell me a fact").await.unwrap(), "a random fact");
        assert_eq!(client.recorded_prompts(), vec!["tell me a fact".to_string()]);
    }

    #[tokio::test]
    async fn passes_provider_errors_through() {
        let client = Arc::new(MockChatClient::new());
        client.queue_error("quota exceeded");
        let generator = testing::generator(client);

        let err = generator.generate("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(ref m) if m == "quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let client = Arc::new(MockChatClient::with_delay(Duration::from_secs(30)));
        let generator = ReplyGenerator::new(client, Duration::from_secs(1));

        let err = generator.generate("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(1)));
    }
}
