use std::ops::Deref;

use mongodb::bson::DateTime;
use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A member's travel preferences for one group, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireCore {
    pub member_id: Id,
    pub group_id: Id,
    /// Budget per person.
    pub budget: f64,
    /// Trip length in days.
    pub trip_length: u32,
    /// How much the member cares about sustainable travel.
    pub eco_priority: u32,
    /// Interest tags, matched against destination categories.
    pub interests: Vec<String>,
    /// Free-form answers from the destination swipe deck.
    pub deck_responses: Map<String, Value>,
    pub created_at: DateTime,
}

/// A questionnaire without an ID.
pub type NewQuestionnaire = QuestionnaireCore;

/// A questionnaire from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub questionnaire: QuestionnaireCore,
}

impl Deref for Questionnaire {
    type Target = QuestionnaireCore;

    fn deref(&self) -> &Self::Target {
        &self.questionnaire
    }
}
