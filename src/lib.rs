pub mod agent;
pub mod models;
pub mod server;
pub mod llm;
pub mod cli;
pub mod history;

use agent::ReplyGenerator;
use cli::Args;
use history::ConversationStore;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let allowed_origins = args.allowed_origins();

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat API Key: {}", if args.chat_api_key.is_empty() { "not set" } else { "set" });
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Temperature: {}", args.temperature);
    info!("Generation Timeout: {}s", args.generation_timeout_secs);
    info!("Allowed Origins: {:?}", allowed_origins);
    info!("-------------------------");

    let generator = ReplyGenerator::from_args(&args)?;
    let store = Arc::new(ConversationStore::new(generator));
    let server = Server::new(args.server_addr.clone(), store, allowed_origins);
    server.run().await?;

    Ok(())
}
