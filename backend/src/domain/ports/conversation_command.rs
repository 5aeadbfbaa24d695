//! Driving port for appending messages to a conversation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::{
    ConversationId, Error, MessageContent, MessageId, MessagePayload, UserAccount,
};

/// Request to send a message into an existing conversation.
///
/// The sent date is stamped by the service, not by the caller.
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub sender: Arc<UserAccount>,
    pub replied_to: Option<MessageId>,
    pub content: MessageContent,
}

/// Response carrying the stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: MessagePayload,
}

/// Driving port for conversation write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationCommand: Send + Sync {
    /// Append a message and persist the conversation.
    ///
    /// Fails with `NotFound` when the conversation does not exist and with
    /// `InvalidArgument` when the sender is not a participant; nothing is
    /// saved in either case.
    async fn send_message(
        &self,
        request: SendMessageRequest,
        cancellation: &CancellationToken,
    ) -> Result<SendMessageResponse, Error>;
}

/// Fixture command that rejects every send as an unknown conversation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConversationCommand;

#[async_trait]
impl ConversationCommand for FixtureConversationCommand {
    async fn send_message(
        &self,
        request: SendMessageRequest,
        _cancellation: &CancellationToken,
    ) -> Result<SendMessageResponse, Error> {
        Err(Error::not_found(format!(
            "conversation {} not found",
            request.conversation_id
        )))
    }
}
