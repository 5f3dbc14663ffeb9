use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One turn of a conversation. `id` is always the message's position in its
/// transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: usize,
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(id: usize, text: impl Into<String>) -> Self {
        Self { id, sender: Sender::User, text: text.into() }
    }

    pub fn bot(id: usize, text: impl Into<String>) -> Self {
        Self { id, sender: Sender::Bot, text: text.into() }
    }
}

pub type Transcript = Vec<ChatMessage>;
