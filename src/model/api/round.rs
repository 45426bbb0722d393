use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    common::round::{CandidateId, RoundNumber, RoundStatus},
    db::round::Round,
};

/// A voting round as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDescription {
    pub id: ApiId,
    pub group_id: ApiId,
    pub number: RoundNumber,
    pub status: RoundStatus,
    pub winner: Option<CandidateId>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<Round> for RoundDescription {
    fn from(round: Round) -> Self {
        let core = round.round;
        Self {
            id: round.id.into(),
            group_id: core.group_id.into(),
            number: core.number,
            status: core.status,
            winner: core.winner,
            created_at: core.created_at.to_chrono(),
            ended_at: core.ended_at.map(|ended_at| ended_at.to_chrono()),
        }
    }
}

/// The result of closing a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub round_id: ApiId,
    pub number: RoundNumber,
    pub status: RoundStatus,
    pub winner: Option<CandidateId>,
}

impl From<Round> for RoundOutcome {
    fn from(round: Round) -> Self {
        Self {
            round_id: round.id.into(),
            number: round.round.number,
            status: round.round.status,
            winner: round.round.winner,
        }
    }
}
