use std::ops::{Deref, DerefMut};

use log::{debug, info};
use mongodb::{
    bson::{doc, DateTime},
    options::FindOneOptions,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{
        resolution::Resolution,
        round::{CandidateId, RoundNumber, RoundStatus},
    },
    mongodb::{inserted_id, is_duplicate_key_error, Coll, Id},
};

/// Core voting round data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCore {
    pub group_id: Id,
    /// Position of this round within its group, starting at 1.
    pub number: RoundNumber,
    pub status: RoundStatus,
    /// The chosen candidate, if the round produced one.
    pub winner: Option<CandidateId>,
    pub created_at: DateTime,
    /// When the round was resolved.
    pub ended_at: Option<DateTime>,
}

impl RoundCore {
    /// Create a new open round with the given number.
    pub fn open(group_id: Id, number: RoundNumber) -> Self {
        Self {
            group_id,
            number,
            status: RoundStatus::Open,
            winner: None,
            created_at: DateTime::now(),
            ended_at: None,
        }
    }
}

/// A round without an ID.
pub type NewRound = RoundCore;

/// A voting round from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub round: RoundCore,
}

impl Deref for Round {
    type Target = RoundCore;

    fn deref(&self) -> &Self::Target {
        &self.round
    }
}

impl DerefMut for Round {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.round
    }
}

impl Round {
    /// Get the group's open round, opening the next one if there is none.
    ///
    /// The next round is numbered one past the group's highest round so far.
    /// At most one round per group is open at a time; concurrent callers all
    /// receive the same round.
    pub async fn open_or_get(
        rounds: &Coll<Round>,
        new_rounds: &Coll<NewRound>,
        group_id: Id,
    ) -> Result<Round> {
        let open = doc! {
            "group_id": group_id,
            "status": RoundStatus::Open,
        };
        if let Some(round) = rounds.find_one(open.clone(), None).await? {
            debug!("Group {group_id} already has open round {}", round.number);
            return Ok(round);
        }

        let latest_first = FindOneOptions::builder().sort(doc! { "number": -1 }).build();
        let latest = rounds
            .find_one(doc! { "group_id": group_id }, latest_first)
            .await?;
        let number = latest.map_or(1, |round| round.number + 1);

        let new_round = NewRound::open(group_id, number);
        match new_rounds.insert_one(&new_round, None).await {
            Ok(result) => {
                info!("Opened round {number} for group {group_id}");
                Ok(Round {
                    id: inserted_id(result)?,
                    round: new_round,
                })
            }
            // Another request opened a round for this group first.
            Err(e) if is_duplicate_key_error(&e) => rounds
                .find_one(open, None)
                .await?
                .ok_or_else(|| {
                    Error::conflict(format!(
                        "Round {number} of group {group_id} was opened and closed concurrently"
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }

    /// Record the resolution of this round, closing it.
    ///
    /// Only an open round can be closed, and only once: if another request
    /// closed it in the meantime this fails with `Conflict`.
    pub async fn finish(mut self, resolution: Resolution, rounds: &Coll<Round>) -> Result<Round> {
        let ended_at = DateTime::now();
        let filter = doc! {
            "_id": self.id,
            "status": RoundStatus::Open,
        };
        let update = doc! {
            "$set": {
                "status": resolution.status,
                "winner": resolution.winner.clone(),
                "ended_at": ended_at,
            }
        };
        let result = rounds.update_one(filter, update, None).await?;
        if result.matched_count == 0 {
            return Err(Error::conflict(format!(
                "Round {} is already closed",
                self.number
            )));
        }

        info!(
            "Closed round {} of group {} as {:?} (winner: {:?})",
            self.number, self.group_id, resolution.status, resolution.winner
        );
        self.status = resolution.status;
        self.winner = resolution.winner;
        self.ended_at = Some(ended_at);
        Ok(self)
    }
}
