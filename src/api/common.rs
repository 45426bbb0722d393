use mongodb::{bson::doc, options::FindOptions};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    api::group::GroupDescription,
    db::{group::Group, member::Member, round::Round},
    mongodb::{Coll, Id},
};

/// Look up a group, or fail with `NotFound`.
pub async fn group_by_id(groups: &Coll<Group>, group_id: Id) -> Result<Group> {
    groups
        .find_one(group_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Group {group_id}")))
}

/// The current members of a group, in the order they joined.
pub async fn members_of(members: &Coll<Member>, group_id: Id) -> Result<Vec<Member>> {
    let filter = doc! {
        "group_id": group_id,
    };
    let by_join_order = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    Ok(members
        .find(filter, by_join_order)
        .await?
        .try_collect()
        .await?)
}

/// Look up a member of the given group, or fail with `NotFound`.
pub async fn member_in_group(members: &Coll<Member>, group_id: Id, member_id: Id) -> Result<Member> {
    let filter = doc! {
        "_id": member_id,
        "group_id": group_id,
    };
    members
        .find_one(filter, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Member {member_id} of group {group_id}")))
}

/// Look up a round of the given group, or fail with `NotFound`.
pub async fn round_in_group(rounds: &Coll<Round>, group_id: Id, round_id: Id) -> Result<Round> {
    let filter = doc! {
        "_id": round_id,
        "group_id": group_id,
    };
    rounds
        .find_one(filter, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Round {round_id} of group {group_id}")))
}

/// Describe a group together with its current members.
pub async fn describe_group(group: Group, members: &Coll<Member>) -> Result<GroupDescription> {
    let group_members = members_of(members, group.id).await?;
    Ok(GroupDescription::new(group, group_members))
}
