//! Port for loading and saving whole conversations.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Conversation, ConversationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversation repository adapters.
    pub enum ConversationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "conversation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "conversation repository query failed: {message}",
    }
}

/// Port for conversation persistence.
///
/// Adapters rebuild the scope (connection or group) and the stored messages,
/// typically through [`Conversation::with_history`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Load a conversation by id.
    async fn find_by_id(
        &self,
        conversation_id: &ConversationId,
        cancellation: &CancellationToken,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Persist the conversation and its full message log.
    async fn save(
        &self,
        conversation: &Conversation,
        cancellation: &CancellationToken,
    ) -> Result<(), ConversationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise conversation storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConversationRepository;

#[async_trait]
impl ConversationRepository for FixtureConversationRepository {
    async fn find_by_id(
        &self,
        _conversation_id: &ConversationId,
        _cancellation: &CancellationToken,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        Ok(None)
    }

    async fn save(
        &self,
        _conversation: &Conversation,
        _cancellation: &CancellationToken,
    ) -> Result<(), ConversationRepositoryError> {
        Ok(())
    }
}
