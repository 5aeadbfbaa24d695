//! Port for message persistence used by the recipe-removal cascade.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Message, RecipeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "message repository query failed: {message}",
    }
}

/// Port for reading and deleting persisted messages.
///
/// Every call receives the caller's cancellation token; adapters should stop
/// outstanding I/O once it fires.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// All messages that still reference `recipe_id`.
    async fn messages_with_recipe(
        &self,
        recipe_id: &RecipeId,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, MessageRepositoryError>;

    /// Delete `message`. Returns `false` when it no longer exists.
    async fn delete(
        &self,
        message: &Message,
        cancellation: &CancellationToken,
    ) -> Result<bool, MessageRepositoryError>;
}

/// Fixture implementation for tests that do not exercise message storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageRepository;

#[async_trait]
impl MessageRepository for FixtureMessageRepository {
    async fn messages_with_recipe(
        &self,
        _recipe_id: &RecipeId,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(
        &self,
        _message: &Message,
        _cancellation: &CancellationToken,
    ) -> Result<bool, MessageRepositoryError> {
        Ok(false)
    }
}
