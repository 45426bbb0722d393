use chrono::{DateTime, Utc};
use mongodb::bson;
use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    db::questionnaire::{NewQuestionnaire, Questionnaire},
    mongodb::Id,
};

/// A submitted questionnaire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireSpec {
    pub budget: Option<f64>,
    pub trip_length: Option<u32>,
    pub eco_priority: Option<u32>,
    pub interests: Option<Vec<String>>,
    pub deck_responses: Option<Value>,
}

impl QuestionnaireSpec {
    /// Check the questionnaire and attach it to a member of a group.
    ///
    /// `budget` and `tripLength` are required. `deckResponses` must be an
    /// object if given; it, `ecoPriority` and `interests` default to empty.
    pub fn into_questionnaire(self, member_id: Id, group_id: Id) -> Result<NewQuestionnaire> {
        let (budget, trip_length) = match (self.budget, self.trip_length) {
            (Some(budget), Some(trip_length)) if budget.is_finite() && budget >= 0.0 => {
                (budget, trip_length)
            }
            _ => return Err(Error::validation("budget and tripLength are required")),
        };
        let deck_responses = match self.deck_responses {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(Error::validation("deckResponses must be an object")),
        };
        Ok(NewQuestionnaire {
            member_id,
            group_id,
            budget,
            trip_length,
            eco_priority: self.eco_priority.unwrap_or(0),
            interests: self.interests.unwrap_or_default(),
            deck_responses,
            created_at: bson::DateTime::now(),
        })
    }
}

/// A questionnaire as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDescription {
    pub id: ApiId,
    pub member_id: ApiId,
    pub group_id: ApiId,
    pub budget: f64,
    pub trip_length: u32,
    pub eco_priority: u32,
    pub interests: Vec<String>,
    pub deck_responses: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl From<Questionnaire> for QuestionnaireDescription {
    fn from(questionnaire: Questionnaire) -> Self {
        let core = questionnaire.questionnaire;
        Self {
            id: questionnaire.id.into(),
            member_id: core.member_id.into(),
            group_id: core.group_id.into(),
            budget: core.budget,
            trip_length: core.trip_length,
            eco_priority: core.eco_priority,
            interests: core.interests,
            deck_responses: core.deck_responses,
            created_at: core.created_at.to_chrono(),
        }
    }
}
