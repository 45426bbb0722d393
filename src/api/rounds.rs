use log::debug;
use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::api::common::{group_by_id, member_in_group, members_of, round_in_group};
use crate::error::{Error, Result};
use crate::model::{
    api::{
        round::{RoundDescription, RoundOutcome},
        vote::{VoteDescription, VoteSpec},
    },
    common::resolution::resolve,
    db::{
        group::Group,
        member::Member,
        round::{NewRound, Round},
        vote::{Vote, VoteCore},
    },
    mongodb::{Coll, Id},
};
use crate::{Config, TieBreaker};

pub fn routes() -> Vec<Route> {
    routes![list_rounds, open_round, list_votes, cast_vote, close_round]
}

#[get("/groups/<group_id>/rounds")]
async fn list_rounds(
    group_id: Id,
    groups: Coll<Group>,
    rounds: Coll<Round>,
) -> Result<Json<Vec<RoundDescription>>> {
    group_by_id(&groups, group_id).await?;

    let filter = doc! {
        "group_id": group_id,
    };
    let by_number = FindOptions::builder().sort(doc! { "number": 1 }).build();
    let found: Vec<Round> = rounds.find(filter, by_number).await?.try_collect().await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

/// Get the group's open round, opening a new one if needed.
#[post("/groups/<group_id>/rounds")]
async fn open_round(
    group_id: Id,
    groups: Coll<Group>,
    rounds: Coll<Round>,
    new_rounds: Coll<NewRound>,
) -> Result<Json<RoundDescription>> {
    group_by_id(&groups, group_id).await?;
    let round = Round::open_or_get(&rounds, &new_rounds, group_id).await?;
    Ok(Json(round.into()))
}

/// Load every vote in a round, in the order they were first cast.
async fn votes_in_round(votes: &Coll<Vote>, round_id: Id) -> Result<Vec<Vote>> {
    let filter = doc! {
        "round_id": round_id,
    };
    let by_first_cast = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    Ok(votes.find(filter, by_first_cast).await?.try_collect().await?)
}

#[get("/groups/<group_id>/rounds/<round_id>/votes")]
async fn list_votes(
    group_id: Id,
    round_id: Id,
    rounds: Coll<Round>,
    votes: Coll<Vote>,
) -> Result<Json<Vec<VoteDescription>>> {
    round_in_group(&rounds, group_id, round_id).await?;
    let found = votes_in_round(&votes, round_id).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

#[post("/groups/<group_id>/rounds/<round_id>/vote", data = "<spec>", format = "json")]
async fn cast_vote(
    group_id: Id,
    round_id: Id,
    spec: Json<VoteSpec>,
    rounds: Coll<Round>,
    members: Coll<Member>,
    votes: Coll<Vote>,
) -> Result<Json<VoteDescription>> {
    let vote = spec.0.validate()?;
    let round = round_in_group(&rounds, group_id, round_id).await?;
    if !round.status.is_open() {
        return Err(Error::validation(format!(
            "Round {} has already been resolved",
            round.number
        )));
    }
    member_in_group(&members, round.group_id, vote.member_id).await?;

    let vote = Vote::upsert(&votes, &round, vote).await?;
    debug!(
        "Member {} voted {} on {} in round {}",
        vote.member_id, vote.value, vote.place, round.number
    );
    Ok(Json(vote.into()))
}

/// Resolve a round from its votes and the group's current members.
#[post("/groups/<group_id>/rounds/<round_id>/close")]
async fn close_round(
    group_id: Id,
    round_id: Id,
    rounds: Coll<Round>,
    members: Coll<Member>,
    votes: Coll<Vote>,
    config: &State<Config>,
    tie_breaker: &State<TieBreaker>,
) -> Result<Json<RoundOutcome>> {
    let round = round_in_group(&rounds, group_id, round_id).await?;
    if !round.status.is_open() {
        return Err(Error::conflict(format!(
            "Round {} is already closed",
            round.number
        )));
    }

    let round_votes: Vec<VoteCore> = votes_in_round(&votes, round_id)
        .await?
        .into_iter()
        .map(|vote| vote.vote)
        .collect();
    let member_ids: Vec<Id> = members_of(&members, round.group_id)
        .await?
        .into_iter()
        .map(|member| member.id)
        .collect();

    let resolution = tie_breaker.with_rng(|rng| {
        resolve(
            round.number,
            &round_votes,
            &member_ids,
            config.round_escalation_threshold(),
            rng,
        )
    })?;
    let round = round.finish(resolution, &rounds).await?;
    Ok(Json(round.into()))
}
