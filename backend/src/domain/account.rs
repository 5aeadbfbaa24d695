//! User account and credential data model.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::ids::{AccountId, ConnectionId, ConversationId};

/// Validation errors returned by account and credential constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    HandlerTooShort { min: usize },
    HandlerTooLong { max: usize },
    HandlerInvalidCharacters,
    EmptyUserName,
    UserNameTooLong { max: usize },
    EmptyProfileImageId,
    InvalidEmail,
    EmptyPassword,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandlerTooShort { min } => {
                write!(f, "handler must be at least {min} characters")
            }
            Self::HandlerTooLong { max } => {
                write!(f, "handler must be at most {max} characters")
            }
            Self::HandlerInvalidCharacters => write!(
                f,
                "handler may only contain ASCII letters, digits, underscores, or dots",
            ),
            Self::EmptyUserName => write!(f, "user name must not be empty"),
            Self::UserNameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::EmptyProfileImageId => write!(f, "profile image id must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a single local@domain address"),
            Self::EmptyPassword => write!(f, "encrypted password must not be empty"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Minimum allowed length for a handler.
pub const HANDLER_MIN: usize = 3;
/// Maximum allowed length for a handler.
pub const HANDLER_MAX: usize = 20;
/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 50;

/// Public `@handle` of an account. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handler(String);

impl Handler {
    /// Validate and construct a [`Handler`].
    pub fn new(handler: impl Into<String>) -> Result<Self, AccountValidationError> {
        let handler = handler.into();
        let length = handler.chars().count();
        if length < HANDLER_MIN {
            return Err(AccountValidationError::HandlerTooShort { min: HANDLER_MIN });
        }
        if length > HANDLER_MAX {
            return Err(AccountValidationError::HandlerTooLong { max: HANDLER_MAX });
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.';
        if !handler.chars().all(allowed) {
            return Err(AccountValidationError::HandlerInvalidCharacters);
        }
        Ok(Self(handler))
    }
}

impl AsRef<str> for Handler {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Handler> for String {
    fn from(value: Handler) -> Self {
        value.0
    }
}

impl TryFrom<String> for Handler {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name shown next to the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(user_name: impl Into<String>) -> Result<Self, AccountValidationError> {
        let user_name = user_name.into();
        if user_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyUserName);
        }
        if user_name.chars().count() > USER_NAME_MAX {
            return Err(AccountValidationError::UserNameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(user_name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorisation role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Social profile of a user.
///
/// ## Invariants
/// - `id`, `handler`, and `account_creation_date` never change after creation.
/// - Pinned conversations and blocked connections are sets: adding a present
///   id or removing an absent one leaves them unchanged.
///
/// Conversation code only reads accounts; they are shared as
/// `Arc<UserAccount>` between credentials, connections, groups, and messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    id: AccountId,
    handler: Handler,
    user_name: UserName,
    profile_image_id: Option<String>,
    account_creation_date: DateTime<Utc>,
    role: Role,
    pinned_conversations: BTreeSet<ConversationId>,
    blocked_connections: BTreeSet<ConnectionId>,
}

impl UserAccount {
    /// Build a new account with no pins, no blocks, and no profile image.
    pub fn new(
        id: AccountId,
        handler: Handler,
        user_name: UserName,
        account_creation_date: DateTime<Utc>,
        role: Role,
    ) -> Self {
        Self {
            id,
            handler,
            user_name,
            profile_image_id: None,
            account_creation_date,
            role,
            pinned_conversations: BTreeSet::new(),
            blocked_connections: BTreeSet::new(),
        }
    }

    /// Stable account identifier.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Immutable public handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    pub fn set_user_name(&mut self, user_name: UserName) {
        self.user_name = user_name;
    }

    /// Identifier of the hosted profile image, if any.
    pub fn profile_image_id(&self) -> Option<&str> {
        self.profile_image_id.as_deref()
    }

    /// Replace or clear the profile image reference.
    pub fn set_profile_image_id(
        &mut self,
        profile_image_id: Option<String>,
    ) -> Result<(), AccountValidationError> {
        if profile_image_id
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            return Err(AccountValidationError::EmptyProfileImageId);
        }
        self.profile_image_id = profile_image_id;
        Ok(())
    }

    pub fn account_creation_date(&self) -> DateTime<Utc> {
        self.account_creation_date
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Pin a conversation. Returns `false` when it was already pinned.
    pub fn add_pin(&mut self, conversation_id: ConversationId) -> bool {
        self.pinned_conversations.insert(conversation_id)
    }

    /// Unpin a conversation. Returns `false` when it was not pinned.
    pub fn remove_pin(&mut self, conversation_id: &ConversationId) -> bool {
        self.pinned_conversations.remove(conversation_id)
    }

    pub fn is_pinned(&self, conversation_id: &ConversationId) -> bool {
        self.pinned_conversations.contains(conversation_id)
    }

    /// Point-in-time copy of the pinned conversation ids, sorted.
    pub fn pinned_conversation_ids(&self) -> Vec<ConversationId> {
        self.pinned_conversations.iter().cloned().collect()
    }

    /// Block a connection. Returns `false` when it was already blocked.
    pub fn add_block(&mut self, connection_id: ConnectionId) -> bool {
        self.blocked_connections.insert(connection_id)
    }

    /// Unblock a connection. Returns `false` when it was not blocked.
    pub fn remove_block(&mut self, connection_id: &ConnectionId) -> bool {
        self.blocked_connections.remove(connection_id)
    }

    pub fn is_blocked(&self, connection_id: &ConnectionId) -> bool {
        self.blocked_connections.contains(connection_id)
    }

    /// Point-in-time copy of the blocked connection ids, sorted.
    pub fn blocked_connection_ids(&self) -> Vec<ConnectionId> {
        self.blocked_connections.iter().cloned().collect()
    }
}

/// Normalised e-mail address used to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate an address and lower-case it.
    pub fn new(email: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let email = email.as_ref().trim().to_lowercase();
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AccountValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Password in its encrypted form. The buffer is wiped on drop.
#[derive(Clone)]
pub struct EncryptedPassword(Zeroizing<String>);

impl EncryptedPassword {
    pub fn new(encrypted: impl Into<String>) -> Result<Self, AccountValidationError> {
        let encrypted = Zeroizing::new(encrypted.into());
        if encrypted.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        Ok(Self(encrypted))
    }

    /// Borrow the encrypted value for comparison by the credential checker.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for EncryptedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptedPassword(<redacted>)")
    }
}

/// Sign-in credentials wrapping a shared account.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    account: Arc<UserAccount>,
    email: Email,
    password: EncryptedPassword,
}

impl UserCredentials {
    pub fn new(account: Arc<UserAccount>, email: Email, password: EncryptedPassword) -> Self {
        Self {
            account,
            email,
            password,
        }
    }

    pub fn account(&self) -> &Arc<UserAccount> {
        &self.account
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &EncryptedPassword {
        &self.password
    }

    /// Swap the stored password after a successful change request.
    pub fn set_password(&mut self, password: EncryptedPassword) {
        self.password = password;
    }
}
