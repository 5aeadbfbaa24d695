//! Messaging domain: accounts, connections, groups, messages and
//! conversations, plus the recipe-removal cascade.
//!
//! Purpose: enforce the conversation invariants (participant-only senders,
//! most-recent-first ordering) and decide which recipe messages die when a
//! recipe is removed. All I/O goes through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — domain error with a stable code.
//! - UserAccount / UserCredentials — identity, profile, pins and blocks.
//! - Connection / Group — the two audiences a conversation can have.
//! - Message / MessageContent — text, image and recipe messages.
//! - Conversation — the ordered message log.
//! - RecipeRemovedCascade — deletes messages orphaned by a recipe removal.

pub mod account;
pub mod connection;
pub mod conversation;
pub mod conversation_service;
pub mod error;
pub mod group;
pub mod ids;
pub mod message;
pub mod notifications;
pub mod payloads;
pub mod ports;
pub mod recipe_cascade;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account::{
    AccountValidationError, Email, EncryptedPassword, Handler, Role, UserAccount,
    UserCredentials, UserName,
};
pub use self::connection::{Connection, ConnectionStatus, ParseConnectionStatusError};
pub use self::conversation::{Conversation, ConversationScope, Participants};
pub use self::conversation_service::ConversationCommandService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::group::Group;
pub use self::ids::{
    AccountId, ConnectionId, ConversationId, GroupId, IdValidationError, MessageId, RecipeId,
};
pub use self::message::{
    Message, MessageContent, MessageDraft, MessageKind, MessageValidationError,
};
pub use self::notifications::{NotificationHandler, NotificationPublisher, RecipeRemoved};
pub use self::payloads::{
    ConnectionPayload, ConversationPayload, ConversationScopePayload, GroupPayload,
    MessageContentPayload, MessagePayload, UserAccountPayload,
};
pub use self::recipe_cascade::{IntegrityPolicy, RecipeRemovedCascade};

/// Result alias for domain operations.
///
/// # Examples
/// ```
/// use messaging_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("conversation c1 not found"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
