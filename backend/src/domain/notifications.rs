//! In-process notifications and their dispatch.
//!
//! A notification announces something that already happened elsewhere (a
//! recipe was deleted, say). Handlers react independently; the publisher only
//! fans out and never interprets the payload.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Error, RecipeId};

/// Raised after a recipe has been deleted from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRemoved {
    /// Identifier of the deleted recipe.
    pub recipe_id: RecipeId,
}

impl RecipeRemoved {
    pub fn new(recipe_id: RecipeId) -> Self {
        Self { recipe_id }
    }
}

/// Reaction to a notification of type `N`.
#[async_trait]
pub trait NotificationHandler<N: Sync>: Send + Sync {
    /// Handle one notification. The token must be forwarded to any
    /// collaborator the handler calls.
    async fn handle(&self, notification: &N, cancellation: &CancellationToken)
    -> Result<(), Error>;
}

/// Fans a notification out to every registered handler in registration order.
pub struct NotificationPublisher<N: Sync> {
    handlers: Vec<Arc<dyn NotificationHandler<N>>>,
}

impl<N: Sync> Default for NotificationPublisher<N> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<N> NotificationPublisher<N>
where
    N: Sync + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn NotificationHandler<N>>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Deliver `notification`, stopping at the first handler error.
    pub async fn publish(
        &self,
        notification: &N,
        cancellation: &CancellationToken,
    ) -> Result<(), Error> {
        for (index, handler) in self.handlers.iter().enumerate() {
            if cancellation.is_cancelled() {
                return Err(Error::cancelled("notification dispatch cancelled"));
            }
            debug!(handler = index, ?notification, "dispatching notification");
            handler.handle(notification, cancellation).await?;
        }
        Ok(())
    }
}
