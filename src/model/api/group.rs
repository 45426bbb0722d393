use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::{id::ApiId, member::MemberDescription},
    db::{
        group::{Group, NewGroup},
        member::Member,
    },
};

/// A request to create a group together with its initial members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub group_name: Option<String>,
    pub members: Option<Vec<String>>,
}

impl GroupSpec {
    /// Check the request, returning the new group and the names of its members.
    pub fn validate(self) -> Result<(NewGroup, Vec<String>)> {
        let name = non_empty(self.group_name);
        let members = self.members.filter(|members| !members.is_empty());
        match (name, members) {
            (Some(name), Some(members)) => {
                if members.iter().any(|member| member.trim().is_empty()) {
                    return Err(Error::validation("Member names must not be empty"));
                }
                Ok((NewGroup::new(name), members))
            }
            _ => Err(Error::validation("groupName and members are required")),
        }
    }
}

/// A request to rename a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRename {
    pub name: Option<String>,
}

impl GroupRename {
    pub fn validate(self) -> Result<String> {
        non_empty(self.name).ok_or_else(|| Error::validation("Name is required"))
    }
}

/// A group as returned by the API, with its members in order of joining.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDescription {
    pub id: ApiId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub members: Vec<MemberDescription>,
}

impl GroupDescription {
    pub fn new(group: Group, members: Vec<Member>) -> Self {
        Self {
            id: group.id.into(),
            name: group.group.name,
            created_at: group.group.created_at.to_chrono(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Trim a name, treating a blank one as missing.
pub(crate) fn non_empty(name: Option<String>) -> Option<String> {
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl GroupSpec {
        pub fn example() -> Self {
            Self {
                group_name: Some("Lisbon or bust".to_string()),
                members: Some(vec!["Ana".into(), "Ben".into(), "Caz".into()]),
            }
        }
    }
}
