pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ LlmConfig, LlmType, ProviderError };
use self::gemini::GeminiChatClient;
use self::ollama::OllamaClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_requires_an_api_key() {
        let config = LlmConfig { api_key: None, ..LlmConfig::default() };
        let err = new_client(&config).err().expect("missing key must be rejected");
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn ollama_uses_local_defaults() {
        let config = LlmConfig { llm_type: LlmType::Ollama, ..LlmConfig::default() };
        let client = new_client(&config).expect("ollama needs no key");
        assert_eq!(client.get_base_url().as_deref(), Some("http://localhost:11434"));
        assert!(!client.get_model().is_empty());
    }
}
