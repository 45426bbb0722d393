use std::ops::{Deref, DerefMut};

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core member data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCore {
    /// The group this member was created in.
    pub group_id: Id,
    pub name: String,
    /// Whether the member has already seen the "questions generated" animation.
    #[serde(default)]
    pub questions_generated_animation: bool,
    pub created_at: DateTime,
}

impl MemberCore {
    /// Create a new member of the given group.
    pub fn new(group_id: Id, name: String) -> Self {
        Self {
            group_id,
            name,
            questions_generated_animation: false,
            created_at: DateTime::now(),
        }
    }
}

/// A member without an ID.
pub type NewMember = MemberCore;

/// A member from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub member: MemberCore,
}

impl Deref for Member {
    type Target = MemberCore;

    fn deref(&self) -> &Self::Target {
        &self.member
    }
}

impl DerefMut for Member {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.member
    }
}
