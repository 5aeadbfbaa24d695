//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    AccountId, Connection, ConnectionId, ConnectionStatus, Group, GroupId, Handler, Message,
    MessageContent, MessageDraft, MessageId, RecipeId, Role, UserAccount, UserName,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn account(id: &str) -> UserAccount {
    let handler: String = format!("h_{id}")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(20)
        .collect();
    UserAccount::new(
        AccountId::new(id).expect("valid account id"),
        Handler::new(handler).expect("valid handler"),
        UserName::new(format!("User {id}")).expect("valid user name"),
        fixture_timestamp(),
        Role::User,
    )
}

pub(crate) fn shared_account(id: &str) -> Arc<UserAccount> {
    Arc::new(account(id))
}

pub(crate) fn connection(first: &str, second: &str) -> Connection {
    Connection::new(
        ConnectionId::new(format!("{first}-{second}")).expect("valid connection id"),
        shared_account(first),
        shared_account(second),
        ConnectionStatus::Connected,
    )
    .expect("distinct accounts")
}

pub(crate) fn group(name: &str, members: &[&str]) -> Group {
    Group::new(
        GroupId::new(name).expect("valid group id"),
        name,
        members.iter().map(|id| shared_account(id)).collect(),
    )
    .expect("valid group")
}

pub(crate) fn draft(id: &str, sender: Arc<UserAccount>, content: MessageContent) -> MessageDraft {
    MessageDraft {
        id: MessageId::new(id).expect("valid message id"),
        sender,
        sent_date: fixture_timestamp(),
        updated_date: None,
        replied_to: None,
        seen_by: Vec::new(),
        content,
    }
}

pub(crate) fn text_message(id: &str, sender: Arc<UserAccount>, text: &str) -> Message {
    Message::new(draft(
        id,
        sender,
        MessageContent::Text {
            text: text.to_owned(),
        },
    ))
    .expect("valid text message")
}

pub(crate) fn recipe_message(
    id: &str,
    sender: Arc<UserAccount>,
    recipes: &[&str],
    text: &str,
) -> Message {
    Message::new(draft(
        id,
        sender,
        MessageContent::Recipe {
            text: text.to_owned(),
            recipe_ids: recipes
                .iter()
                .map(|raw| RecipeId::new(*raw).expect("valid recipe id"))
                .collect(),
        },
    ))
    .expect("valid recipe message")
}
