mod memory;

use thiserror::Error;

pub use memory::ConversationStore;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found")]
    NotFound,
    #[error("Invalid message id")]
    InvalidIndex,
}
