use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider used to generate replies (gemini, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// API Key for the Chat LLM provider (required for gemini)
    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-1.5-flash, llama3)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// Upper bound on tokens generated per reply.
    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value = "1000")]
    pub max_output_tokens: u32,

    /// Sampling temperature for reply generation.
    #[arg(long, env = "TEMPERATURE", default_value = "0.1")]
    pub temperature: f32,

    /// Seconds to wait for a reply before recording a timeout as the bot message.
    #[arg(long, env = "GENERATION_TIMEOUT_SECS", default_value = "60")]
    pub generation_timeout_secs: u64,

    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Frontend origin allowed by CORS.
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Production origin allowed by CORS.
    #[arg(long, env = "PRODUCTION_URL")]
    pub production_url: Option<String>,

    /// Test frontend origin allowed by CORS.
    #[arg(long, env = "TEST_FRONTEND_URL")]
    pub test_frontend_url: Option<String>,
}

impl Args {
    pub fn allowed_origins(&self) -> Vec<String> {
        [&self.frontend_url, &self.production_url, &self.test_frontend_url]
            .into_iter()
            .flatten()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}
