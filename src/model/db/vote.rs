use std::ops::Deref;

use mongodb::{
    bson::{doc, DateTime},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::vote::ValidVote,
    common::round::CandidateId,
    db::round::Round,
    mongodb::{is_duplicate_key_error, Coll, Id},
};

/// A member's yes/no vote on one candidate in one round, as stored in the database.
///
/// (`member_id`, `round_id`, `place`) is unique; voting again overwrites
/// `value` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    pub round_id: Id,
    pub group_id: Id,
    pub member_id: Id,
    /// The candidate being voted on.
    pub place: CandidateId,
    pub value: bool,
    pub created_at: DateTime,
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl Vote {
    /// Record a member's vote in the given round, replacing any earlier vote
    /// by the same member on the same candidate.
    pub async fn upsert(votes: &Coll<Vote>, round: &Round, vote: ValidVote) -> Result<Vote> {
        let filter = doc! {
            "member_id": vote.member_id,
            "round_id": round.id,
            "place": &vote.place,
        };
        let update = doc! {
            "$set": {
                "value": vote.value,
                "created_at": DateTime::now(),
            },
            "$setOnInsert": {
                "group_id": round.group_id,
            },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        // Two first votes racing on the same key both try to insert; the
        // loser retries and updates the winner's document instead.
        let result = match votes
            .find_one_and_update(filter.clone(), update.clone(), options.clone())
            .await
        {
            Err(e) if is_duplicate_key_error(&e) => {
                votes.find_one_and_update(filter, update, options).await
            }
            other => other,
        }?;
        result.ok_or_else(|| {
            Error::Unexpected(format!("Upserted vote on {} not returned", vote.place))
        })
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl VoteCore {
        pub fn example(member_id: Id, place: &str, value: bool) -> Self {
            Self {
                round_id: Id::new(),
                group_id: Id::new(),
                member_id,
                place: place.to_string(),
                value,
                created_at: DateTime::now(),
            }
        }
    }
}
