use chrono::{DateTime, Utc};
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    common::round::CandidateId,
    db::vote::Vote,
    mongodb::Id,
};

/// A vote as submitted by a member. The value is kept as raw JSON so that
/// anything other than a literal boolean can be rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSpec {
    pub member_id: Option<String>,
    pub place: Option<String>,
    pub value: Option<Value>,
}

/// A vote that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVote {
    pub member_id: Id,
    pub place: CandidateId,
    pub value: bool,
}

impl VoteSpec {
    pub fn validate(self) -> Result<ValidVote> {
        let required = || Error::validation("memberId, place, and value are required");
        let member_id = self
            .member_id
            .filter(|id| !id.is_empty())
            .ok_or_else(required)?;
        let place = self
            .place
            .filter(|place| !place.is_empty())
            .ok_or_else(required)?;
        let value = match self.value {
            Some(Value::Bool(value)) => value,
            _ => return Err(required()),
        };
        let member_id = member_id
            .parse::<Id>()
            .map_err(|_| Error::validation(format!("Malformed member ID '{member_id}'")))?;
        Ok(ValidVote {
            member_id,
            place,
            value,
        })
    }
}

/// A vote as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDescription {
    pub id: ApiId,
    pub round_id: ApiId,
    pub group_id: ApiId,
    pub member_id: ApiId,
    pub place: CandidateId,
    pub value: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for VoteDescription {
    fn from(vote: Vote) -> Self {
        let core = vote.vote;
        Self {
            id: vote.id.into(),
            round_id: core.round_id.into(),
            group_id: core.group_id.into(),
            member_id: core.member_id.into(),
            place: core.place,
            value: core.value,
            created_at: core.created_at.to_chrono(),
        }
    }
}
