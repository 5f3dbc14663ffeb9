use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType, ProviderError };
use log::debug;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Serialize, Debug, Clone, Default)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: Option<String>,
        completion_model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>
    ) -> Self {
        let model = completion_model.unwrap_or_else(|| "cogito:3b".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(
            Self::new(
                config.base_url.clone(),
                config.completion_model.clone(),
                config.max_tokens,
                config.temperature
            )
        )
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerateResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt,
            stream: false,
            options: &self.options,
        };
        debug!("OllamaClient::generate() → {} model={}", url, self.completion_model);
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<GenerateResponse>().await?;
        Ok(data)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let generated = self.generate(prompt).await?;
        if generated.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(CompletionResponse { response: generated.response })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
