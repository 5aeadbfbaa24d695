//! Conversation logs scoped to a connection or a group.
//!
//! Both conversation variants share one append routine; they differ only in
//! how [`Participants::is_participant`] decides who may send. The log keeps
//! the most recent message at the front so the latest entry is an O(1) read
//! and iteration yields most-recent-first.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::json;

use super::{
    AccountId, Connection, ConversationId, Error, Group, Message, MessageId, RecipeId, UserAccount,
};

/// Capability deciding whether an account may post into a conversation.
pub trait Participants {
    /// Whether `account_id` belongs to the conversation's audience.
    fn is_participant(&self, account_id: &AccountId) -> bool;
}

impl Participants for Connection {
    fn is_participant(&self, account_id: &AccountId) -> bool {
        self.involves(account_id)
    }
}

impl Participants for Group {
    fn is_participant(&self, account_id: &AccountId) -> bool {
        self.is_member(account_id)
    }
}

/// The audience a conversation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationScope {
    Connection(Connection),
    Group(Group),
}

impl Participants for ConversationScope {
    fn is_participant(&self, account_id: &AccountId) -> bool {
        match self {
            Self::Connection(connection) => connection.is_participant(account_id),
            Self::Group(group) => group.is_participant(account_id),
        }
    }
}

impl From<Connection> for ConversationScope {
    fn from(value: Connection) -> Self {
        Self::Connection(value)
    }
}

impl From<Group> for ConversationScope {
    fn from(value: Group) -> Self {
        Self::Group(value)
    }
}

/// Ordered message log for one connection or group.
///
/// ## Invariants
/// - Every message in the log was sent by a participant of `scope`.
/// - Iteration order is the reverse of append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    id: ConversationId,
    scope: ConversationScope,
    log: VecDeque<Message>,
}

impl Conversation {
    /// Start an empty conversation.
    pub fn new(id: ConversationId, scope: impl Into<ConversationScope>) -> Self {
        Self {
            id,
            scope: scope.into(),
            log: VecDeque::new(),
        }
    }

    /// Rebuild a conversation from stored messages given oldest first.
    ///
    /// Each message goes through [`Conversation::send_message`], so a stored
    /// message from a non-participant rejects the whole reload.
    pub fn with_history(
        id: ConversationId,
        scope: impl Into<ConversationScope>,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<Self, Error> {
        let mut conversation = Self::new(id, scope);
        for message in messages {
            conversation.send_message(message)?;
        }
        Ok(conversation)
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn scope(&self) -> &ConversationScope {
        &self.scope
    }

    /// Append `message`, making it the most recent entry.
    ///
    /// Fails with [`ErrorCode::InvalidArgument`](super::ErrorCode::InvalidArgument)
    /// when the sender is not a participant; the log is left untouched.
    pub fn send_message(&mut self, message: Message) -> Result<(), Error> {
        let sender_id = message.sender().id();
        if !self.scope.is_participant(sender_id) {
            return Err(Error::invalid_argument(format!(
                "message {} cannot be sent to conversation {}: sender {} is not a participant",
                message.id(),
                self.id,
                sender_id,
            ))
            .with_details(json!({
                "messageId": message.id().as_str(),
                "conversationId": self.id.as_str(),
                "senderId": sender_id.as_str(),
            })));
        }
        self.log.push_front(message);
        Ok(())
    }

    /// Messages, most recently sent first. The borrow pins the log, so the
    /// view cannot observe later appends.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = &Message> + DoubleEndedIterator {
        self.log.iter()
    }

    /// Owned copy of the log, most recently sent first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.iter().cloned().collect()
    }

    pub fn latest_message(&self) -> Option<&Message> {
        self.log.front()
    }

    pub fn find_message(&self, message_id: &MessageId) -> Option<&Message> {
        self.log.iter().find(|message| message.id() == message_id)
    }

    /// Resolve the message `message` replies to, if it is in this log.
    pub fn replied_to(&self, message: &Message) -> Option<&Message> {
        message
            .replied_to()
            .and_then(|target| self.find_message(target))
    }

    /// Record that `account` has seen `message_id`.
    ///
    /// Returns `Ok(false)` when the account had already seen it.
    pub fn mark_seen(
        &mut self,
        message_id: &MessageId,
        account: Arc<UserAccount>,
    ) -> Result<bool, Error> {
        if !self.scope.is_participant(account.id()) {
            return Err(Error::invalid_argument(format!(
                "account {} is not a participant of conversation {}",
                account.id(),
                self.id,
            ))
            .with_details(json!({
                "accountId": account.id().as_str(),
                "conversationId": self.id.as_str(),
            })));
        }
        let conversation_id = &self.id;
        let message = self
            .log
            .iter_mut()
            .find(|message| message.id() == message_id)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "message {message_id} not found in conversation {conversation_id}"
                ))
            })?;
        Ok(message.mark_seen_by(account))
    }

    /// Take `message_id` out of the log, keeping the order of the rest.
    pub fn remove_message(&mut self, message_id: &MessageId) -> Option<Message> {
        let position = self
            .log
            .iter()
            .position(|message| message.id() == message_id)?;
        self.log.remove(position)
    }

    /// Drop `recipe_id` from every logged message that keeps other recipes.
    ///
    /// Returns how many messages changed.
    pub fn remove_recipe(&mut self, recipe_id: &RecipeId) -> usize {
        self.log
            .iter_mut()
            .map(|message| message.remove_recipe(recipe_id))
            .filter(|changed| *changed)
            .count()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
