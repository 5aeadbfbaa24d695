//! Transport payloads for messaging entities.
//!
//! Entities stay free of wire concerns; callers map them through these
//! `camelCase` serde payloads. Messages also map back so stored snapshots can
//! be rehydrated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    AccountId, Connection, ConnectionId, ConnectionStatus, Conversation, ConversationId,
    ConversationScope, Error, Group, GroupId, Handler, Message, MessageContent, MessageDraft,
    MessageId, RecipeId, Role, UserAccount, UserName,
};

/// Serializable account payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountPayload {
    pub id: AccountId,
    pub handler: Handler,
    pub user_name: UserName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_id: Option<String>,
    pub account_creation_date: DateTime<Utc>,
    pub role: Role,
    #[serde(default)]
    pub pinned_conversation_ids: Vec<ConversationId>,
    #[serde(default)]
    pub blocked_connection_ids: Vec<ConnectionId>,
}

impl From<&UserAccount> for UserAccountPayload {
    fn from(value: &UserAccount) -> Self {
        Self {
            id: value.id().clone(),
            handler: value.handler().clone(),
            user_name: value.user_name().clone(),
            profile_image_id: value.profile_image_id().map(str::to_owned),
            account_creation_date: value.account_creation_date(),
            role: value.role(),
            pinned_conversation_ids: value.pinned_conversation_ids(),
            blocked_connection_ids: value.blocked_connection_ids(),
        }
    }
}

impl TryFrom<UserAccountPayload> for UserAccount {
    type Error = Error;

    fn try_from(value: UserAccountPayload) -> Result<Self, Self::Error> {
        let mut account = Self::new(
            value.id,
            value.handler,
            value.user_name,
            value.account_creation_date,
            value.role,
        );
        account
            .set_profile_image_id(value.profile_image_id)
            .map_err(|err| Error::invalid_argument(format!("invalid account payload: {err}")))?;
        for conversation_id in value.pinned_conversation_ids {
            account.add_pin(conversation_id);
        }
        for connection_id in value.blocked_connection_ids {
            account.add_block(connection_id);
        }
        Ok(account)
    }
}

/// Serializable connection payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPayload {
    pub connection_id: ConnectionId,
    pub account1: UserAccountPayload,
    pub account2: UserAccountPayload,
    pub status: ConnectionStatus,
}

impl From<&Connection> for ConnectionPayload {
    fn from(value: &Connection) -> Self {
        Self {
            connection_id: value.id().clone(),
            account1: value.account1().as_ref().into(),
            account2: value.account2().as_ref().into(),
            status: value.status(),
        }
    }
}

/// Serializable group payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<UserAccountPayload>,
}

impl From<&Group> for GroupPayload {
    fn from(value: &Group) -> Self {
        Self {
            id: value.id().clone(),
            name: value.name().to_owned(),
            members: value
                .members()
                .iter()
                .map(|member| member.as_ref().into())
                .collect(),
        }
    }
}

/// Variant payload of a message, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContentPayload {
    Text {
        text: String,
    },
    Image {
        #[serde(default)]
        text: String,
        #[serde(rename = "imageUrls")]
        image_urls: Vec<Url>,
    },
    Recipe {
        #[serde(default)]
        text: String,
        #[serde(rename = "recipeIds")]
        recipe_ids: Vec<RecipeId>,
    },
}

impl From<&MessageContent> for MessageContentPayload {
    fn from(value: &MessageContent) -> Self {
        match value.clone() {
            MessageContent::Text { text } => Self::Text { text },
            MessageContent::Image { text, image_urls } => Self::Image { text, image_urls },
            MessageContent::Recipe { text, recipe_ids } => Self::Recipe { text, recipe_ids },
        }
    }
}

impl From<MessageContentPayload> for MessageContent {
    fn from(value: MessageContentPayload) -> Self {
        match value {
            MessageContentPayload::Text { text } => Self::Text { text },
            MessageContentPayload::Image { text, image_urls } => Self::Image { text, image_urls },
            MessageContentPayload::Recipe { text, recipe_ids } => Self::Recipe { text, recipe_ids },
        }
    }
}

/// Serializable message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: MessageId,
    pub sender: UserAccountPayload,
    pub sent_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_to_message_id: Option<MessageId>,
    #[serde(default)]
    pub seen_by: Vec<UserAccountPayload>,
    #[serde(flatten)]
    pub content: MessageContentPayload,
}

impl From<&Message> for MessagePayload {
    fn from(value: &Message) -> Self {
        Self {
            id: value.id().clone(),
            sender: value.sender().as_ref().into(),
            sent_date: value.sent_date(),
            updated_date: value.updated_date(),
            replied_to_message_id: value.replied_to().cloned(),
            seen_by: value
                .seen_by()
                .iter()
                .map(|account| account.as_ref().into())
                .collect(),
            content: value.content().into(),
        }
    }
}

impl TryFrom<MessagePayload> for Message {
    type Error = Error;

    fn try_from(value: MessagePayload) -> Result<Self, Self::Error> {
        let seen_by = value
            .seen_by
            .into_iter()
            .map(|account| UserAccount::try_from(account).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let draft = MessageDraft {
            id: value.id,
            sender: Arc::new(UserAccount::try_from(value.sender)?),
            sent_date: value.sent_date,
            updated_date: value.updated_date,
            replied_to: value.replied_to_message_id,
            seen_by,
            content: value.content.into(),
        };
        Self::new(draft).map_err(Error::from)
    }
}

/// Audience of a conversation, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationScopePayload {
    Connection { connection: ConnectionPayload },
    Group { group: GroupPayload },
}

/// Serializable conversation payload with messages most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub conversation_id: ConversationId,
    pub scope: ConversationScopePayload,
    pub messages: Vec<MessagePayload>,
}

impl From<&Conversation> for ConversationPayload {
    fn from(value: &Conversation) -> Self {
        let scope = match value.scope() {
            ConversationScope::Connection(connection) => ConversationScopePayload::Connection {
                connection: connection.into(),
            },
            ConversationScope::Group(group) => ConversationScopePayload::Group {
                group: group.into(),
            },
        };
        Self {
            conversation_id: value.id().clone(),
            scope,
            messages: value.messages().map(MessagePayload::from).collect(),
        }
    }
}
