use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{api::group::non_empty, api::id::ApiId, db::member::Member};

/// A request to add a member to an existing group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberSpec {
    pub name: Option<String>,
}

impl MemberSpec {
    pub fn validate(self) -> Result<String> {
        non_empty(self.name).ok_or_else(|| Error::validation("Member name is required"))
    }
}

/// A partial update of a member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub questions_generated_animation: Option<bool>,
}

impl MemberUpdate {
    /// Build the `$set` document for this update.
    /// Fails if there is nothing to update.
    pub fn into_update(self) -> Result<Document> {
        let mut set = Document::new();
        if let Some(name) = self.name {
            let name = non_empty(Some(name))
                .ok_or_else(|| Error::validation("Member name must not be empty"))?;
            set.insert("name", name);
        }
        if let Some(seen) = self.questions_generated_animation {
            set.insert("questions_generated_animation", seen);
        }
        if set.is_empty() {
            return Err(Error::validation("Nothing to update"));
        }
        Ok(doc! { "$set": set })
    }
}

/// A member as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDescription {
    pub id: ApiId,
    pub name: String,
    pub group_id: ApiId,
    pub questions_generated_animation: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberDescription {
    fn from(member: Member) -> Self {
        Self {
            id: member.id.into(),
            name: member.member.name,
            group_id: member.member.group_id.into(),
            questions_generated_animation: member.member.questions_generated_animation,
            created_at: member.member.created_at.to_chrono(),
        }
    }
}
