//! Connections between two distinct accounts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AccountId, ConnectionId, Error, UserAccount};

/// Relationship status, ordered from least to most close.
///
/// Transitions are unrestricted here; policy such as "a blocked connection
/// cannot jump to favourite" belongs to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Blocked,
    Muted,
    Pending,
    Connected,
    Favourite,
}

impl ConnectionStatus {
    /// Stable lower-case name used in payloads and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Muted => "muted",
            Self::Pending => "pending",
            Self::Connected => "connected",
            Self::Favourite => "favourite",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown connection status: {0}")]
pub struct ParseConnectionStatusError(String);

impl FromStr for ConnectionStatus {
    type Err = ParseConnectionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocked" => Ok(Self::Blocked),
            "muted" => Ok(Self::Muted),
            "pending" => Ok(Self::Pending),
            "connected" => Ok(Self::Connected),
            "favourite" => Ok(Self::Favourite),
            other => Err(ParseConnectionStatusError(other.to_owned())),
        }
    }
}

/// Bidirectional relationship between two accounts.
///
/// ## Invariants
/// - `account1` and `account2` have different ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    account1: Arc<UserAccount>,
    account2: Arc<UserAccount>,
    status: ConnectionStatus,
}

impl Connection {
    /// Create a connection, rejecting a self-connection with
    /// [`ErrorCode::InvalidArgument`](super::ErrorCode::InvalidArgument).
    pub fn new(
        id: ConnectionId,
        account1: Arc<UserAccount>,
        account2: Arc<UserAccount>,
        status: ConnectionStatus,
    ) -> Result<Self, Error> {
        if account1.id() == account2.id() {
            return Err(Error::invalid_argument(format!(
                "connection {id} must join two distinct accounts"
            ))
            .with_details(json!({
                "connectionId": id.as_str(),
                "accountId": account1.id().as_str(),
            })));
        }
        Ok(Self {
            id,
            account1,
            account2,
            status,
        })
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn account1(&self) -> &Arc<UserAccount> {
        &self.account1
    }

    pub fn account2(&self) -> &Arc<UserAccount> {
        &self.account2
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Whether `account_id` is one of the two ends.
    pub fn involves(&self, account_id: &AccountId) -> bool {
        self.account1.id() == account_id || self.account2.id() == account_id
    }

    /// The account on the other end from `account_id`, if it is an end at all.
    pub fn counterpart_of(&self, account_id: &AccountId) -> Option<&Arc<UserAccount>> {
        if self.account1.id() == account_id {
            Some(&self.account2)
        } else if self.account2.id() == account_id {
            Some(&self.account1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for connection construction and status handling.

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::test_fixtures::shared_account;
    use rstest::rstest;

    fn connection_id() -> ConnectionId {
        ConnectionId::new("k1").expect("valid id")
    }

    #[rstest]
    fn distinct_accounts_are_preserved() {
        let first = shared_account("u1");
        let second = shared_account("u2");

        let connection = Connection::new(
            connection_id(),
            Arc::clone(&first),
            Arc::clone(&second),
            ConnectionStatus::Pending,
        )
        .expect("distinct accounts connect");

        assert!(Arc::ptr_eq(connection.account1(), &first));
        assert!(Arc::ptr_eq(connection.account2(), &second));
        assert_eq!(connection.status(), ConnectionStatus::Pending);
    }

    #[rstest]
    fn same_account_id_is_rejected() {
        let error = Connection::new(
            connection_id(),
            shared_account("u1"),
            shared_account("u1"),
            ConnectionStatus::Connected,
        )
        .expect_err("self connection rejected");

        assert_eq!(error.code(), ErrorCode::InvalidArgument);
        assert_eq!(
            error.details(),
            Some(&json!({"connectionId": "k1", "accountId": "u1"}))
        );
    }

    #[rstest]
    fn status_is_freely_mutable() {
        let mut connection = Connection::new(
            connection_id(),
            shared_account("u1"),
            shared_account("u2"),
            ConnectionStatus::Blocked,
        )
        .expect("distinct accounts connect");

        connection.set_status(ConnectionStatus::Favourite);
        assert_eq!(connection.status(), ConnectionStatus::Favourite);
    }

    #[rstest]
    fn counterpart_resolves_the_other_end() {
        let connection = Connection::new(
            connection_id(),
            shared_account("u1"),
            shared_account("u2"),
            ConnectionStatus::Connected,
        )
        .expect("distinct accounts connect");
        let u1 = AccountId::new("u1").expect("valid id");
        let u2 = AccountId::new("u2").expect("valid id");
        let u3 = AccountId::new("u3").expect("valid id");

        assert_eq!(connection.counterpart_of(&u1).map(|a| a.id()), Some(&u2));
        assert_eq!(connection.counterpart_of(&u2).map(|a| a.id()), Some(&u1));
        assert!(connection.counterpart_of(&u3).is_none());
        assert!(connection.involves(&u1));
        assert!(!connection.involves(&u3));
    }

    #[rstest]
    fn statuses_are_ordered_by_closeness() {
        assert!(ConnectionStatus::Blocked < ConnectionStatus::Muted);
        assert!(ConnectionStatus::Muted < ConnectionStatus::Pending);
        assert!(ConnectionStatus::Pending < ConnectionStatus::Connected);
        assert!(ConnectionStatus::Connected < ConnectionStatus::Favourite);
    }

    #[rstest]
    #[case(ConnectionStatus::Blocked)]
    #[case(ConnectionStatus::Muted)]
    #[case(ConnectionStatus::Pending)]
    #[case(ConnectionStatus::Connected)]
    #[case(ConnectionStatus::Favourite)]
    fn status_names_parse_back(#[case] status: ConnectionStatus) {
        assert_eq!(status.to_string().parse::<ConnectionStatus>(), Ok(status));
    }

    #[rstest]
    fn unknown_status_names_are_rejected() {
        let err = "friend".parse::<ConnectionStatus>().expect_err("unknown");
        assert_eq!(err.to_string(), "unknown connection status: friend");
    }
}
