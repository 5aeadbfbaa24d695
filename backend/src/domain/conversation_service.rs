//! Conversation domain services.
//!
//! The command service loads a conversation, appends the new message under the
//! participant check, and saves the result. Conversations are request-scoped:
//! each call works on a fresh copy from the repository.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::ports::{
    ConversationCommand, ConversationRepository, ConversationRepositoryError, SendMessageRequest,
    SendMessageResponse,
};
use crate::domain::{ConversationId, Error, Message, MessageDraft, MessagePayload};

fn map_repository_error(error: ConversationRepositoryError) -> Error {
    match error {
        ConversationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("conversation repository unavailable: {message}"))
        }
        ConversationRepositoryError::Query { message } => {
            Error::internal(format!("conversation repository error: {message}"))
        }
    }
}

fn ensure_active(
    cancellation: &CancellationToken,
    conversation_id: &ConversationId,
) -> Result<(), Error> {
    if cancellation.is_cancelled() {
        return Err(Error::cancelled("send message was cancelled")
            .with_details(json!({ "conversationId": conversation_id.as_str() })));
    }
    Ok(())
}

/// Conversation service implementing the command driving port.
#[derive(Clone)]
pub struct ConversationCommandService<R> {
    conversation_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ConversationCommandService<R> {
    /// Create a new command service with the conversation repository and a
    /// clock used to stamp sent dates.
    pub fn new(conversation_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            conversation_repo,
            clock,
        }
    }
}

#[async_trait]
impl<R> ConversationCommand for ConversationCommandService<R>
where
    R: ConversationRepository,
{
    async fn send_message(
        &self,
        request: SendMessageRequest,
        cancellation: &CancellationToken,
    ) -> Result<SendMessageResponse, Error> {
        let SendMessageRequest {
            conversation_id,
            message_id,
            sender,
            replied_to,
            content,
        } = request;

        ensure_active(cancellation, &conversation_id)?;
        let mut conversation = self
            .conversation_repo
            .find_by_id(&conversation_id, cancellation)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("conversation {conversation_id} not found"))
                    .with_details(json!({ "conversationId": conversation_id.as_str() }))
            })?;

        if let Some(target) = replied_to
            .as_ref()
            .filter(|target| conversation.find_message(target).is_none())
        {
            return Err(Error::invalid_argument(format!(
                "message {target} is not part of conversation {conversation_id}"
            ))
            .with_details(json!({
                "messageId": message_id.as_str(),
                "repliedToMessageId": target.as_str(),
                "conversationId": conversation_id.as_str(),
            })));
        }

        let message = Message::new(MessageDraft {
            id: message_id,
            sender,
            sent_date: self.clock.utc(),
            updated_date: None,
            replied_to,
            seen_by: Vec::new(),
            content,
        })?;
        let payload = MessagePayload::from(&message);
        conversation.send_message(message)?;

        ensure_active(cancellation, &conversation_id)?;
        self.conversation_repo
            .save(&conversation, cancellation)
            .await
            .map_err(map_repository_error)?;
        debug!(
            conversation_id = %conversation_id,
            message_id = %payload.id,
            log_len = conversation.len(),
            "message appended"
        );

        Ok(SendMessageResponse { message: payload })
    }
}

#[cfg(test)]
#[path = "conversation_service_tests.rs"]
mod tests;
