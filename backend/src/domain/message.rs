//! Messages and their content variants.
//!
//! A message is shared data (id, sender, timestamps, reply link, seen-by
//! list) plus a tagged [`MessageContent`] payload. Replies point at an earlier
//! message by id only; the link is resolved against the owning conversation
//! and never implies ownership.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AccountId, Error, MessageId, RecipeId, UserAccount};

/// Validation errors raised by [`Message::new`] and message mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    EmptyText,
    MissingImages,
    MissingRecipes,
    RepliesToItself { message_id: MessageId },
    UpdatedBeforeSent,
}

impl fmt::Display for MessageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "text message must not be empty"),
            Self::MissingImages => write!(f, "image message must carry at least one image"),
            Self::MissingRecipes => {
                write!(f, "recipe message must reference at least one recipe")
            }
            Self::RepliesToItself { message_id } => {
                write!(f, "message {message_id} cannot reply to itself")
            }
            Self::UpdatedBeforeSent => write!(f, "message cannot be updated before it was sent"),
        }
    }
}

impl std::error::Error for MessageValidationError {}

impl From<MessageValidationError> for Error {
    fn from(value: MessageValidationError) -> Self {
        Self::invalid_argument(value.to_string())
    }
}

/// Discriminant of [`MessageContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Recipe,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Recipe => "recipe",
        })
    }
}

/// Variant-specific payload of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text { text: String },
    Image { text: String, image_urls: Vec<Url> },
    Recipe { text: String, recipe_ids: Vec<RecipeId> },
}

impl MessageContent {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Image { .. } => MessageKind::Image,
            Self::Recipe { .. } => MessageKind::Recipe,
        }
    }

    /// Free text attached to the message. May be empty for image and recipe
    /// messages.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Image { text, .. } | Self::Recipe { text, .. } => {
                text.as_str()
            }
        }
    }

    fn validate(&self) -> Result<(), MessageValidationError> {
        match self {
            Self::Text { text } if text.trim().is_empty() => Err(MessageValidationError::EmptyText),
            Self::Image { image_urls, .. } if image_urls.is_empty() => {
                Err(MessageValidationError::MissingImages)
            }
            Self::Recipe { recipe_ids, .. } if recipe_ids.is_empty() => {
                Err(MessageValidationError::MissingRecipes)
            }
            _ => Ok(()),
        }
    }
}

/// Input payload for [`Message::new`].
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub id: MessageId,
    pub sender: Arc<UserAccount>,
    pub sent_date: DateTime<Utc>,
    pub updated_date: Option<DateTime<Utc>>,
    pub replied_to: Option<MessageId>,
    pub seen_by: Vec<Arc<UserAccount>>,
    pub content: MessageContent,
}

/// A single authored unit of content.
///
/// Messages compare equal field by field; within a conversation they are
/// told apart by `id`, which the issuing collaborator keeps unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    sender: Arc<UserAccount>,
    sent_date: DateTime<Utc>,
    updated_date: Option<DateTime<Utc>>,
    replied_to: Option<MessageId>,
    seen_by: Vec<Arc<UserAccount>>,
    content: MessageContent,
}

impl Message {
    /// Creates a validated message.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// # let draft = sample_message_draft();
    /// let message = messaging_backend::domain::Message::new(draft)?;
    /// assert!(message.updated_date().is_none());
    /// # Ok::<(), messaging_backend::domain::MessageValidationError>(())
    /// ```
    pub fn new(draft: MessageDraft) -> Result<Self, MessageValidationError> {
        let MessageDraft {
            id,
            sender,
            sent_date,
            updated_date,
            replied_to,
            seen_by,
            content,
        } = draft;

        content.validate()?;
        if replied_to.as_ref() == Some(&id) {
            return Err(MessageValidationError::RepliesToItself { message_id: id });
        }
        if updated_date.is_some_and(|updated| updated < sent_date) {
            return Err(MessageValidationError::UpdatedBeforeSent);
        }

        let mut message = Self {
            id,
            sender,
            sent_date,
            updated_date,
            replied_to,
            seen_by: Vec::with_capacity(seen_by.len()),
            content,
        };
        for account in seen_by {
            message.mark_seen_by(account);
        }
        Ok(message)
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> &Arc<UserAccount> {
        &self.sender
    }

    pub fn sent_date(&self) -> DateTime<Utc> {
        self.sent_date
    }

    pub fn updated_date(&self) -> Option<DateTime<Utc>> {
        self.updated_date
    }

    /// Id of the earlier message this one replies to.
    pub fn replied_to(&self) -> Option<&MessageId> {
        self.replied_to.as_ref()
    }

    pub fn seen_by(&self) -> &[Arc<UserAccount>] {
        self.seen_by.as_slice()
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn kind(&self) -> MessageKind {
        self.content.kind()
    }

    pub fn text(&self) -> &str {
        self.content.text()
    }

    /// Recipe references, or `None` for non-recipe messages.
    pub fn recipe_ids(&self) -> Option<&[RecipeId]> {
        match &self.content {
            MessageContent::Recipe { recipe_ids, .. } => Some(recipe_ids.as_slice()),
            MessageContent::Text { .. } | MessageContent::Image { .. } => None,
        }
    }

    pub fn image_urls(&self) -> Option<&[Url]> {
        match &self.content {
            MessageContent::Image { image_urls, .. } => Some(image_urls.as_slice()),
            MessageContent::Text { .. } | MessageContent::Recipe { .. } => None,
        }
    }

    /// Record that `account` has seen the message. Returns `false` when an
    /// account with the same id was already recorded.
    pub fn mark_seen_by(&mut self, account: Arc<UserAccount>) -> bool {
        if self.has_been_seen_by(account.id()) {
            return false;
        }
        self.seen_by.push(account);
        true
    }

    pub fn has_been_seen_by(&self, account_id: &AccountId) -> bool {
        self.seen_by.iter().any(|seen| seen.id() == account_id)
    }

    /// Replace the free text and stamp `updated_date`.
    pub fn edit_text(
        &mut self,
        new_text: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), MessageValidationError> {
        if at < self.sent_date {
            return Err(MessageValidationError::UpdatedBeforeSent);
        }
        let new_text = new_text.into();
        if self.kind() == MessageKind::Text && new_text.trim().is_empty() {
            return Err(MessageValidationError::EmptyText);
        }
        match &mut self.content {
            MessageContent::Text { text }
            | MessageContent::Image { text, .. }
            | MessageContent::Recipe { text, .. } => *text = new_text,
        }
        self.updated_date = Some(at);
        Ok(())
    }

    pub fn references_recipe(&self, recipe_id: &RecipeId) -> bool {
        self.recipe_ids()
            .is_some_and(|recipe_ids| recipe_ids.contains(recipe_id))
    }

    /// Drop a recipe reference. Returns `false` when nothing was removed.
    ///
    /// The last reference is never removed: a recipe message left with no
    /// recipes is deleted by the cascade instead.
    pub fn remove_recipe(&mut self, recipe_id: &RecipeId) -> bool {
        let MessageContent::Recipe { recipe_ids, .. } = &mut self.content else {
            return false;
        };
        if !recipe_ids.contains(recipe_id) || recipe_ids.iter().all(|existing| existing == recipe_id)
        {
            return false;
        }
        recipe_ids.retain(|existing| existing != recipe_id);
        true
    }

    /// True for a recipe message whose only reason to exist is a single
    /// recipe reference: exactly one recipe and blank text.
    pub fn is_orphaned_by_recipe_removal(&self) -> bool {
        match &self.content {
            MessageContent::Recipe { text, recipe_ids } => {
                recipe_ids.len() == 1 && text.trim().is_empty()
            }
            MessageContent::Text { .. } | MessageContent::Image { .. } => false,
        }
    }
}
