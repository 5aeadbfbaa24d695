//! In-memory persistence adapter.
//!
//! Holds a `messages` table and a `conversations` table behind one mutex.
//! The message table is the index the recipe cascade reads: saving a
//! conversation upserts its log into it, and deleting or pruning a message
//! applies to every conversation log holding it. Used by the recipe cascade
//! CLI and by integration tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::ports::{
    ConversationRepository, ConversationRepositoryError, MessageRepository,
    MessageRepositoryError,
};
use crate::domain::{Conversation, ConversationId, Message, MessageId, RecipeId};

#[derive(Debug, Default)]
struct StoreState {
    messages: Vec<Message>,
    conversations: BTreeMap<ConversationId, Conversation>,
}

impl StoreState {
    fn upsert_message(&mut self, message: Message) {
        match self
            .messages
            .iter_mut()
            .find(|stored| stored.id() == message.id())
        {
            Some(stored) => *stored = message,
            None => self.messages.push(message),
        }
    }

    fn remove_message(&mut self, message_id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|stored| stored.id() != message_id);
        let mut removed = self.messages.len() != before;
        for conversation in self.conversations.values_mut() {
            removed |= conversation.remove_message(message_id).is_some();
        }
        removed
    }
}

/// Mutex-guarded store implementing both persistence ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the message table, keeping the given order.
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let store = Self::new();
        for message in messages {
            store.insert_message(message);
        }
        store
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // Every write completes before its guard drops, so poisoned state is intact.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a message, replacing any stored message with the same id.
    pub fn insert_message(&self, message: Message) {
        self.state().upsert_message(message);
    }

    /// Store `conversation` and index its log, oldest message first.
    pub fn insert_conversation(&self, conversation: Conversation) {
        let mut state = self.state();
        for message in conversation.messages().rev() {
            state.upsert_message(message.clone());
        }
        state
            .conversations
            .insert(conversation.id().clone(), conversation);
    }

    /// Point-in-time copy of the message table.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    /// Number of rows in the message table.
    pub fn message_count(&self) -> usize {
        self.state().messages.len()
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Option<Conversation> {
        self.state().conversations.get(conversation_id).cloned()
    }

    /// Drop `recipe_id` from every message that keeps other recipes.
    ///
    /// Messages where it is the only recipe are left for the cascade to
    /// delete. Logged copies in stored conversations are pruned too.
    /// Returns how many rows of the message table changed.
    pub fn prune_recipe(&self, recipe_id: &RecipeId) -> usize {
        let mut state = self.state();
        let pruned = state
            .messages
            .iter_mut()
            .map(|message| message.remove_recipe(recipe_id))
            .filter(|changed| *changed)
            .count();
        for conversation in state.conversations.values_mut() {
            conversation.remove_recipe(recipe_id);
        }
        debug!(recipe_id = %recipe_id, pruned, "pruned recipe references");
        pruned
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn messages_with_recipe(
        &self,
        recipe_id: &RecipeId,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(self
            .state()
            .messages
            .iter()
            .filter(|message| message.references_recipe(recipe_id))
            .cloned()
            .collect())
    }

    async fn delete(
        &self,
        message: &Message,
        _cancellation: &CancellationToken,
    ) -> Result<bool, MessageRepositoryError> {
        Ok(self.state().remove_message(message.id()))
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        conversation_id: &ConversationId,
        _cancellation: &CancellationToken,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        Ok(self.conversation(conversation_id))
    }

    async fn save(
        &self,
        conversation: &Conversation,
        _cancellation: &CancellationToken,
    ) -> Result<(), ConversationRepositoryError> {
        self.insert_conversation(conversation.clone());
        Ok(())
    }
}
