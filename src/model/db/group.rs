use std::ops::{Deref, DerefMut};

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core group data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCore {
    /// Group name, unique across all groups.
    pub name: String,
    pub created_at: DateTime,
}

impl GroupCore {
    /// Create a new group, timestamped now.
    pub fn new(name: String) -> Self {
        Self {
            name,
            created_at: DateTime::now(),
        }
    }
}

/// A group without an ID.
pub type NewGroup = GroupCore;

/// A group from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub group: GroupCore,
}

impl Deref for Group {
    type Target = GroupCore;

    fn deref(&self) -> &Self::Target {
        &self.group
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.group
    }
}
