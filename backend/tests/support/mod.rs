//! Shared builders for messaging integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the crate's own unit-test fixtures are not visible here.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use messaging_backend::domain::{
    AccountId, Connection, ConnectionId, ConnectionStatus, Group, GroupId, Handler, Message,
    MessageContent, MessageDraft, MessageId, RecipeId, Role, UserAccount, UserName,
};

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn account(id: &str) -> Arc<UserAccount> {
    Arc::new(UserAccount::new(
        AccountId::new(id).expect("valid account id"),
        Handler::new(format!("cook_{id}")).expect("valid handler"),
        UserName::new(format!("Cook {id}")).expect("valid user name"),
        timestamp(),
        Role::User,
    ))
}

pub fn connection(first: &str, second: &str) -> Connection {
    Connection::new(
        ConnectionId::new(format!("{first}-{second}")).expect("valid connection id"),
        account(first),
        account(second),
        ConnectionStatus::Connected,
    )
    .expect("distinct accounts")
}

pub fn group(name: &str, members: &[&str]) -> Group {
    Group::new(
        GroupId::new(name).expect("valid group id"),
        name,
        members.iter().map(|id| account(id)).collect(),
    )
    .expect("valid group")
}

pub fn message(id: &str, sender: &str, content: MessageContent) -> Message {
    Message::new(MessageDraft {
        id: MessageId::new(id).expect("valid message id"),
        sender: account(sender),
        sent_date: timestamp(),
        updated_date: None,
        replied_to: None,
        seen_by: Vec::new(),
        content,
    })
    .expect("valid message")
}

pub fn recipe_message(id: &str, recipes: &[&str], text: &str) -> Message {
    message(
        id,
        "u1",
        MessageContent::Recipe {
            text: text.to_owned(),
            recipe_ids: recipes
                .iter()
                .map(|raw| RecipeId::new(*raw).expect("valid recipe id"))
                .collect(),
        },
    )
}

pub fn text_message(id: &str, sender: &str, text: &str) -> Message {
    message(
        id,
        sender,
        MessageContent::Text {
            text: text.to_owned(),
        },
    )
}

pub fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id().to_string()).collect()
}
