pub mod api;

use crate::history::ConversationStore;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use log::info;

pub struct Server {
    addr: String,
    store: Arc<ConversationStore>,
    allowed_origins: Vec<String>,
}

impl Server {
    pub fn new(addr: String, store: Arc<ConversationStore>, allowed_origins: Vec<String>) -> Self {
        Self {
            addr,
            store,
            allowed_origins,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.store.clone(), &self.allowed_origins);

        let listener = tokio::net::TcpListener::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
        info!("HTTP server listening on: http://{}", addr);

        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
