use crate::agent::ReplyGenerator;
use crate::history::StoreError;
use crate::models::chat::{ ChatMessage, Transcript };

use log::{ debug, info, warn };
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{ Mutex, RwLock };
use uuid::Uuid;

type SharedTranscript = Arc<Mutex<Transcript>>;

/// In-process conversation transcripts keyed by conversation id.
///
/// Each transcript has its own lock, held for the whole of a mutation
/// (truncate, generate, append), so writes to one conversation are serialised
/// while different conversations proceed independently. The outer map lock is
/// only written by `create` and never held across a generation call.
///
/// Message ids always equal their position. Every content-adding operation
/// pushes one user message followed by one bot message.
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, SharedTranscript>>,
    generator: ReplyGenerator,
}

impl ConversationStore {
    pub fn new(generator: ReplyGenerator) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            generator,
        }
    }

    pub async fn create(&self) -> String {
        let conversation_id = Uuid::new_v4().to_string();
        let mut conversations = self.conversations.write().await;
        conversations.insert(conversation_id.clone(), Arc::new(Mutex::new(Vec::new())));
        info!("Started conversation {} ({} active)", conversation_id, conversations.len());
        conversation_id
    }

    pub async fn read(&self, conversation_id: &str) -> Result<Transcript, StoreError> {
        let transcript = self.lookup(conversation_id).await?;
        let guard = transcript.lock().await;
        Ok(guard.clone())
    }

    pub async fn append(
        &self,
        conversation_id: &str,
        user_text: &str
    ) -> Result<Transcript, StoreError> {
        let transcript = self.lookup(conversation_id).await?;
        let mut guard = transcript.lock().await;
        self.push_exchange(conversation_id, &mut guard, user_text).await;
        Ok(guard.clone())
    }

    /// Replaces the message at `message_index` and everything after it with a
    /// freshly generated exchange for `user_text`.
    pub async fn edit_from(
        &self,
        conversation_id: &str,
        message_index: usize,
        user_text: &str
    ) -> Result<Transcript, StoreError> {
        let transcript = self.lookup(conversation_id).await?;
        let mut guard = transcript.lock().await;
        check_index(&guard, message_index)?;
        debug!(
            "Editing conversation {} from message {} (dropping {} messages)",
            conversation_id,
            message_index,
            guard.len() - message_index
        );
        guard.truncate(message_index);
        self.push_exchange(conversation_id, &mut guard, user_text).await;
        Ok(guard.clone())
    }

    pub async fn truncate_before(
        &self,
        conversation_id: &str,
        message_index: usize
    ) -> Result<Transcript, StoreError> {
        let transcript = self.lookup(conversation_id).await?;
        let mut guard = transcript.lock().await;
        check_index(&guard, message_index)?;
        debug!(
            "Truncating conversation {} to {} messages (was {})",
            conversation_id,
            message_index,
            guard.len()
        );
        guard.truncate(message_index);
        Ok(guard.clone())
    }

    async fn lookup(&self, conversation_id: &str) -> Result<SharedTranscript, StoreError> {
        let conversations = self.conversations.read().await;
        conversations.get(conversation_id).cloned().ok_or_else(|| {
            debug!("Unknown conversation id {}", conversation_id);
            StoreError::NotFound
        })
    }

    async fn push_exchange(&self, conversation_id: &str, transcript: &mut Transcript, user_text: &str) {
        let bot_text = match self.generator.generate(user_text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Reply generation failed for conversation {}: {}", conversation_id, e);
                e.to_string()
            }
        };
        let next_id = transcript.len();
        transcript.push(ChatMessage::user(next_id, user_text));
        transcript.push(ChatMessage::bot(next_id + 1, bot_text));
    }
}

// One past the end is accepted: editing there behaves like an append and
// truncating there is a no-op.
fn check_index(transcript: &Transcript, message_index: usize) -> Result<(), StoreError> {
    if message_index > transcript.len() {
        return Err(StoreError::InvalidIndex);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{ generator, MockChatClient };
    use crate::models::chat::Sender;
    use std::time::Duration;

    fn store_with(client: &Arc<MockChatClient>) -> ConversationStore {
        ConversationStore::new(generator(client.clone()))
    }

    fn assert_positional(transcript: &Transcript) {
        assert_eq!(transcript.len() % 2, 0, "odd transcript length");
        for (index, message) in transcript.iter().enumerate() {
            assert_eq!(message.id, index);
            let expected = if index % 2 == 0 { Sender::User } else { Sender::Bot };
            assert_eq!(message.sender, expected);
        }
    }

    #[tokio::test]
    async fn create_yields_distinct_empty_conversations() {
        let store = store_with(&Arc::new(MockChatClient::new()));
        let first = store.create().await;
        let second = store.create().await;

        assert_ne!(first, second);
        assert!(store.read(&first).await.unwrap().is_empty());
        assert!(store.read(&second).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_adds_a_user_bot_pair() {
        let client = Arc::new(MockChatClient::new());
        client.queue_reply("first reply");
        client.queue_reply("second reply");
        let store = store_with(&client);
        let id = store.create().await;

        let transcript = store.append(&id, "hi").await.unwrap();
        assert_eq!(transcript, vec![ChatMessage::user(0, "hi"), ChatMessage::bot(1, "first reply")]);

        let transcript = store.append(&id, "again").await.unwrap();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[2], ChatMessage::user(2, "again"));
        assert_eq!(transcript[3], ChatMessage::bot(3, "second reply"));
        assert_eq!(store.read(&id).await.unwrap(), transcript);
    }

    #[tokio::test]
    async fn provider_failure_becomes_bot_text() {
        let client = Arc::new(MockChatClient::new());
        client.queue_error("API key not valid");
        let store = store_with(&client);
        let id = store.create().await;

        let transcript = store.append(&id, "hi").await.unwrap();
        assert_eq!(transcript[0], ChatMessage::user(0, "hi"));
        assert_eq!(transcript[1], ChatMessage::bot(1, "API key not valid"));
    }

    #[tokio::test]
    async fn edit_keeps_prefix_and_regenerates_the_rest() {
        let client = Arc::new(MockChatClient::new());
        let store = store_with(&client);
        let id = store.create().await;
        for text in ["one", "two", "three"] {
            store.append(&id, text).await.unwrap();
        }
        let before = store.read(&id).await.unwrap();

        client.queue_reply("fresh");
        let after = store.edit_from(&id, 2, "TWO").await.unwrap();

        assert_eq!(after.len(), 4);
        assert_eq!(after[..2], before[..2]);
        assert_eq!(after[2], ChatMessage::user(2, "TWO"));
        assert_eq!(after[3], ChatMessage::bot(3, "fresh"));
        assert_positional(&after);
    }

    #[tokio::test]
    async fn edit_on_a_bot_message_index_still_appends_a_pair() {
        let store = store_with(&Arc::new(MockChatClient::new()));
        let id = store.create().await;
        store.append(&id, "one").await.unwrap();
        store.append(&id, "two").await.unwrap();

        let after = store.edit_from(&id, 1, "replacement").await.unwrap();

        assert_eq!(after.len(), 3);
        assert_eq!(after[0], ChatMessage::user(0, "one"));
        assert_eq!(after[1], ChatMessage::user(1, "replacement"));
        assert_eq!(after[2].id, 2);
        assert_eq!(after[2].sender, Sender::Bot);
    }

    #[tokio::test]
    async fn edit_one_past_the_end_behaves_like_append() {
        let store = store_with(&Arc::new(MockChatClient::new()));
        let edited = store.create().await;
        let appended = store.create().await;
        for id in [&edited, &appended] {
            store.append(id, "hi").await.unwrap();
        }

        let via_edit = store.edit_from(&edited, 2, "more").await.unwrap();
        let via_append = store.append(&appended, "more").await.unwrap();
        assert_eq!(via_edit, via_append);
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected_without_generating() {
        let client = Arc::new(MockChatClient::new());
        let store = store_with(&client);
        let id = store.create().await;
        store.append(&id, "hi").await.unwrap();

        assert_eq!(store.edit_from(&id, 3, "x").await, Err(StoreError::InvalidIndex));
        assert_eq!(store.truncate_before(&id, 3).await, Err(StoreError::InvalidIndex));
        assert_eq!(client.recorded_prompts(), vec!["hi".to_string()]);
        assert_eq!(store.read(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn truncate_keeps_exactly_the_prefix() {
        let store = store_with(&Arc::new(MockChatClient::new()));
        let id = store.create().await;
        for text in ["one", "two"] {
            store.append(&id, text).await.unwrap();
        }
        let before = store.read(&id).await.unwrap();

        assert_eq!(store.truncate_before(&id, 4).await.unwrap(), before);
        assert_eq!(store.truncate_before(&id, 2).await.unwrap(), before[..2].to_vec());
        assert!(store.truncate_before(&id, 0).await.unwrap().is_empty());
        assert!(store.truncate_before(&id, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_edit_delete_scenario() {
        let store = store_with(&Arc::new(MockChatClient::new()));
        let id = store.create().await;

        let transcript = store.append(&id, "hi").await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_positional(&transcript);

        let transcript = store.edit_from(&id, 0, "bye").await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "bye");
        assert_positional(&transcript);

        let transcript = store.truncate_before(&id, 0).await.unwrap();
        assert!(transcript.is_empty());
        assert!(store.read(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let client = Arc::new(MockChatClient::new());
        let store = store_with(&client);
        store.create().await;

        assert_eq!(store.read("missing").await, Err(StoreError::NotFound));
        assert_eq!(store.append("missing", "hi").await, Err(StoreError::NotFound));
        assert_eq!(store.edit_from("missing", 0, "hi").await, Err(StoreError::NotFound));
        assert_eq!(store.truncate_before("missing", 0).await, Err(StoreError::NotFound));
        assert!(client.recorded_prompts().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_to_one_conversation_stay_positional() {
        let store = Arc::new(store_with(&Arc::new(MockChatClient::new())));
        let id = store.create().await;

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.append(&id, &format!("message {}", n)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let transcript = store.read(&id).await.unwrap();
        assert_eq!(transcript.len(), 32);
        assert_positional(&transcript);
        for pair in transcript.chunks(2) {
            assert_eq!(pair[1].text, format!("echo: {}", pair[0].text));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_conversations_generate_concurrently() {
        let client = Arc::new(MockChatClient::with_delay(Duration::from_secs(1)));
        let store = store_with(&client);
        let a = store.create().await;
        let b = store.create().await;

        let started = tokio::time::Instant::now();
        let (ra, rb) = tokio::join!(store.append(&a, "a"), store.append(&b, "b"));
        ra.unwrap();
        rb.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn same_conversation_mutations_are_serialised() {
        let client = Arc::new(MockChatClient::with_delay(Duration::from_secs(1)));
        let store = store_with(&client);
        let id = store.create().await;

        let started = tokio::time::Instant::now();
        let (first, second) = tokio::join!(store.append(&id, "a"), store.edit_from(&id, 0, "b"));
        first.unwrap();
        second.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));

        let transcript = store.read(&id).await.unwrap();
        assert_positional(&transcript);
        assert_eq!(transcript.len(), 2);
    }
}
