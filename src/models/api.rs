use serde::{ Serialize, Deserialize };
use super::chat::Transcript;

#[derive(Deserialize, Debug)]
pub struct SendMessageRequest {
    pub text: String,
    pub conversation_id: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateMessageRequest {
    pub text: String,
    pub conversation_id: String,
    pub message_id: usize,
}

#[derive(Deserialize, Debug)]
pub struct DeleteMessageRequest {
    pub conversation_id: String,
    pub message_id: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StartConversationResponse {
    pub status: String,
    pub conversation_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TranscriptResponse {
    pub status: String,
    pub response: Transcript,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub detail: String,
}
