//! Ports at the hexagonal boundary of the messaging core.
//!
//! Driven ports (`MessageRepository`, `ConversationRepository`) are
//! implemented by persistence adapters; the driving port
//! (`ConversationCommand`) is implemented by domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod conversation_command;
mod conversation_repository;
mod message_repository;

#[cfg(test)]
pub use conversation_command::MockConversationCommand;
pub use conversation_command::{
    ConversationCommand, FixtureConversationCommand, SendMessageRequest, SendMessageResponse,
};
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
pub use conversation_repository::{
    ConversationRepository, ConversationRepositoryError, FixtureConversationRepository,
};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{
    FixtureMessageRepository, MessageRepository, MessageRepositoryError,
};
