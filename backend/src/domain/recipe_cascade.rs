//! Recipe-removal cascade.
//!
//! When a recipe is deleted, recipe messages whose only content was that one
//! recipe become meaningless and are deleted. Messages that still carry text or
//! other recipes survive; pruning the dead reference from them is the message
//! store's job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{Error, Message, MessageKind, NotificationHandler, RecipeId, RecipeRemoved};

/// What to do when the store returns a non-recipe message for a recipe query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Log the record and keep processing the rest.
    #[default]
    SkipAndLog,
    /// Abort the pass with [`ErrorCode::DataIntegrity`](crate::domain::ErrorCode::DataIntegrity).
    FailFast,
}

fn map_repository_error(error: &MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

fn cancelled(recipe_id: &RecipeId) -> Error {
    Error::cancelled(format!("cascade for recipe {recipe_id} was cancelled"))
        .with_details(json!({ "recipeId": recipe_id.as_str() }))
}

/// Deletes recipe messages orphaned by a recipe removal.
#[derive(Clone)]
pub struct RecipeRemovedCascade<R> {
    message_repo: Arc<R>,
    policy: IntegrityPolicy,
}

impl<R> RecipeRemovedCascade<R> {
    /// Create a cascade with the default skip-and-log integrity policy.
    pub fn new(message_repo: Arc<R>) -> Self {
        Self {
            message_repo,
            policy: IntegrityPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: IntegrityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> IntegrityPolicy {
        self.policy
    }
}

impl<R> RecipeRemovedCascade<R>
where
    R: MessageRepository,
{
    /// Run the cascade for `recipe_id`.
    ///
    /// Each matched message is handled on its own: a failed delete is logged
    /// and the pass continues, then the pass reports the failures as one error.
    /// Running twice for the same recipe leaves the same messages behind.
    pub async fn cascade(
        &self,
        recipe_id: &RecipeId,
        cancellation: &CancellationToken,
    ) -> Result<(), Error> {
        if cancellation.is_cancelled() {
            return Err(cancelled(recipe_id));
        }
        let messages = self
            .message_repo
            .messages_with_recipe(recipe_id, cancellation)
            .await
            .map_err(|err| map_repository_error(&err))?;

        let mut deleted = 0_usize;
        let mut retained = 0_usize;
        let mut skipped = 0_usize;
        let mut failures: Vec<MessageRepositoryError> = Vec::new();

        for message in &messages {
            if cancellation.is_cancelled() {
                return Err(cancelled(recipe_id));
            }
            if message.kind() != MessageKind::Recipe {
                self.integrity_violation(recipe_id, message)?;
                skipped += 1;
                continue;
            }
            if !message.is_orphaned_by_recipe_removal() {
                debug!(
                    recipe_id = %recipe_id,
                    message_id = %message.id(),
                    recipe_count = message.recipe_ids().map_or(0, <[RecipeId]>::len),
                    "recipe message keeps other content; leaving in place"
                );
                retained += 1;
                continue;
            }
            match self.message_repo.delete(message, cancellation).await {
                Ok(true) => {
                    info!(recipe_id = %recipe_id, message_id = %message.id(), "deleted orphaned recipe message");
                    deleted += 1;
                }
                Ok(false) => {
                    debug!(recipe_id = %recipe_id, message_id = %message.id(), "orphaned recipe message already gone");
                }
                Err(err) => {
                    error!(recipe_id = %recipe_id, message_id = %message.id(), error = %err, "failed to delete orphaned recipe message");
                    failures.push(err);
                }
            }
        }

        info!(
            recipe_id = %recipe_id,
            examined = messages.len(),
            deleted,
            retained,
            skipped,
            failed = failures.len(),
            "recipe removal cascade finished"
        );

        match failures.first() {
            None => Ok(()),
            Some(first) => {
                let cause = map_repository_error(first);
                Err(Error::new(
                    cause.code(),
                    format!(
                        "failed to delete {} orphaned message(s) for recipe {recipe_id}: {}",
                        failures.len(),
                        cause.message()
                    ),
                )
                .with_details(json!({
                    "recipeId": recipe_id.as_str(),
                    "failedDeletes": failures.len(),
                })))
            }
        }
    }

    fn integrity_violation(&self, recipe_id: &RecipeId, message: &Message) -> Result<(), Error> {
        match self.policy {
            IntegrityPolicy::FailFast => Err(Error::data_integrity(format!(
                "message {} returned for recipe {recipe_id} is a {} message",
                message.id(),
                message.kind(),
            ))
            .with_details(json!({
                "recipeId": recipe_id.as_str(),
                "messageId": message.id().as_str(),
                "kind": message.kind(),
            }))),
            IntegrityPolicy::SkipAndLog => {
                warn!(
                    recipe_id = %recipe_id,
                    message_id = %message.id(),
                    kind = %message.kind(),
                    "non-recipe message returned for recipe query; skipping"
                );
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<R> NotificationHandler<RecipeRemoved> for RecipeRemovedCascade<R>
where
    R: MessageRepository,
{
    async fn handle(
        &self,
        notification: &RecipeRemoved,
        cancellation: &CancellationToken,
    ) -> Result<(), Error> {
        self.cascade(&notification.recipe_id, cancellation).await
    }
}

#[cfg(test)]
#[path = "recipe_cascade_tests.rs"]
mod tests;
