//! Identifier newtypes shared by the messaging entities.
//!
//! Identifiers are issued by persistence collaborators (document ids, handles,
//! or UUIDs). The domain only requires them to be non-empty and free of
//! surrounding whitespace so equality checks are unambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by identifier constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    Empty { kind: &'static str },
    SurroundingWhitespace { kind: &'static str },
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
            Self::SurroundingWhitespace { kind } => {
                write!(f, "{kind} must not have surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for IdValidationError {}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdValidationError::SurroundingWhitespace { kind });
    }
    Ok(())
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = raw.into();
                validate($kind, &raw)?;
                Ok(Self(raw))
            }

            /// Generate a random identifier backed by a UUID v4.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_id! {
    /// Stable identifier of a user account.
    AccountId => "account id"
}

define_id! {
    /// Identifier of a connection between two accounts.
    ConnectionId => "connection id"
}

define_id! {
    /// Identifier of a named group of accounts.
    GroupId => "group id"
}

define_id! {
    /// Identifier of a single message.
    MessageId => "message id"
}

define_id! {
    /// Identifier of a conversation log.
    ConversationId => "conversation id"
}

define_id! {
    /// Identifier of a recipe referenced by recipe messages.
    RecipeId => "recipe id"
}
