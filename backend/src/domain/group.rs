//! Named groups of accounts.

use std::sync::Arc;

use serde_json::json;

use super::{AccountId, Error, GroupId, UserAccount};

/// A named set of accounts. Membership is decided by account id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    members: Vec<Arc<UserAccount>>,
}

impl Group {
    /// Create a group. Repeated member ids keep their first occurrence.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        members: Vec<Arc<UserAccount>>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_argument(format!("group {id} must have a name"))
                .with_details(json!({ "groupId": id.as_str() })));
        }
        let mut group = Self {
            id,
            name,
            members: Vec::with_capacity(members.len()),
        };
        for member in members {
            group.add_member(member);
        }
        Ok(group)
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Arc<UserAccount>] {
        self.members.as_slice()
    }

    pub fn is_member(&self, account_id: &AccountId) -> bool {
        self.members.iter().any(|member| member.id() == account_id)
    }

    /// Add a member. Returns `false` when the id is already present.
    pub fn add_member(&mut self, account: Arc<UserAccount>) -> bool {
        if self.is_member(account.id()) {
            return false;
        }
        self.members.push(account);
        true
    }

    /// Remove a member. Returns `false` when the id was absent.
    pub fn remove_member(&mut self, account_id: &AccountId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.id() != account_id);
        self.members.len() != before
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for group membership.

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::test_fixtures::shared_account;
    use rstest::rstest;

    fn group_id() -> GroupId {
        GroupId::new("g1").expect("valid id")
    }

    #[rstest]
    fn duplicate_members_collapse() {
        let group = Group::new(
            group_id(),
            "Bakers",
            vec![shared_account("u1"), shared_account("u2"), shared_account("u1")],
        )
        .expect("valid group");

        assert_eq!(group.members().len(), 2);
        assert_eq!(group.name(), "Bakers");
    }

    #[rstest]
    fn blank_name_is_rejected() {
        let err = Group::new(group_id(), " ", Vec::new()).expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    fn membership_changes_report_whether_anything_changed() {
        let mut group = Group::new(group_id(), "Bakers", vec![shared_account("u1")])
            .expect("valid group");
        let u2 = AccountId::new("u2").expect("valid id");

        assert!(!group.is_member(&u2));
        assert!(group.add_member(shared_account("u2")));
        assert!(!group.add_member(shared_account("u2")));
        assert!(group.is_member(&u2));

        assert!(group.remove_member(&u2));
        assert!(!group.remove_member(&u2));
        assert!(!group.is_member(&u2));
    }
}
