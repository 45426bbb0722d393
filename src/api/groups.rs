use log::info;
use mongodb::{bson::doc, options::FindOptions, Client};
use rocket::{
    futures::TryStreamExt,
    serde::json::{json, Json, Value},
    Route, State,
};

use crate::api::common::{describe_group, group_by_id};
use crate::error::{Error, Result};
use crate::model::{
    api::group::{GroupDescription, GroupRename, GroupSpec},
    db::{
        group::{Group, NewGroup},
        member::{Member, NewMember},
        questionnaire::Questionnaire,
        round::Round,
        vote::Vote,
    },
    mongodb::{inserted_id, is_duplicate_key_error, Coll, Id},
};
use crate::session::MemberSession;

pub fn routes() -> Vec<Route> {
    routes![
        list_groups,
        create_group,
        get_group,
        rename_group,
        delete_group
    ]
}

/// Which groups to list.
#[derive(Debug, FromForm)]
pub struct GroupFilter {
    #[field(name = "memberId")]
    member_id: Option<Id>,
}

/// List the groups a member belongs to, newest first. Without an explicit
/// member the session's member is used; with neither the list is empty.
#[get("/groups?<filter..>")]
async fn list_groups(
    filter: GroupFilter,
    session: MemberSession,
    groups: Coll<Group>,
    members: Coll<Member>,
) -> Result<Json<Vec<GroupDescription>>> {
    let Some(member_id) = filter.member_id.or(session.member_id()) else {
        return Ok(Json(Vec::new()));
    };
    let Some(member) = members.find_one(member_id.as_doc(), None).await? else {
        return Ok(Json(Vec::new()));
    };

    let filter = doc! {
        "_id": member.group_id,
    };
    let newest_first = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let found: Vec<Group> = groups.find(filter, newest_first).await?.try_collect().await?;

    let mut descriptions = Vec::with_capacity(found.len());
    for group in found {
        descriptions.push(describe_group(group, &members).await?);
    }
    Ok(Json(descriptions))
}

#[post("/groups", data = "<spec>", format = "json")]
async fn create_group(
    spec: Json<GroupSpec>,
    new_groups: Coll<NewGroup>,
    groups: Coll<Group>,
    new_members: Coll<NewMember>,
    members: Coll<Member>,
    db_client: &State<Client>,
) -> Result<Json<GroupDescription>> {
    let (group, names) = spec.0.validate()?;

    let description = {
        let mut session = db_client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Create and insert the group.
        let group_id = match new_groups
            .insert_one_with_session(&group, None, &mut session)
            .await
        {
            Ok(result) => inserted_id(result)?,
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::conflict(format!(
                    "A group named {:?} already exists",
                    group.name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        // Create and insert its members, in the order given.
        let group_members = names
            .into_iter()
            .map(|name| NewMember::new(group_id, name.trim().to_string()))
            .collect::<Vec<_>>();
        new_members
            .insert_many_with_session(&group_members, None, &mut session)
            .await?;

        // Read everything back, including IDs.
        let group = groups
            .find_one_with_session(group_id.as_doc(), None, &mut session)
            .await?
            .ok_or_else(|| Error::Unexpected(format!("Group {group_id} vanished")))?;
        let filter = doc! {
            "group_id": group_id,
        };
        let by_join_order = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let mut cursor = members
            .find_with_session(filter, by_join_order, &mut session)
            .await?;
        let group_members = cursor
            .stream(&mut session)
            .try_collect::<Vec<_>>()
            .await?;

        session.commit_transaction().await?;
        GroupDescription::new(group, group_members)
    };

    info!(
        "Created group {} ({}) with {} members",
        description.id,
        description.name,
        description.members.len()
    );
    Ok(Json(description))
}

#[get("/groups/<group_id>")]
async fn get_group(
    group_id: Id,
    groups: Coll<Group>,
    members: Coll<Member>,
) -> Result<Json<GroupDescription>> {
    let group = group_by_id(&groups, group_id).await?;
    Ok(Json(describe_group(group, &members).await?))
}

#[put("/groups/<group_id>", data = "<rename>", format = "json")]
async fn rename_group(
    group_id: Id,
    rename: Json<GroupRename>,
    groups: Coll<Group>,
    members: Coll<Member>,
) -> Result<Json<GroupDescription>> {
    let name = rename.0.validate()?;
    let update = doc! {
        "$set": {
            "name": &name,
        }
    };
    let result = match groups.update_one(group_id.as_doc(), update, None).await {
        Ok(result) => result,
        Err(e) if is_duplicate_key_error(&e) => {
            return Err(Error::conflict(format!(
                "A group named {name:?} already exists"
            )));
        }
        Err(e) => return Err(e.into()),
    };
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Group {group_id}")));
    }

    let group = group_by_id(&groups, group_id).await?;
    Ok(Json(describe_group(group, &members).await?))
}

/// Delete a group along with everything that belongs to it.
#[delete("/groups/<group_id>")]
async fn delete_group(
    group_id: Id,
    groups: Coll<Group>,
    members: Coll<Member>,
    questionnaires: Coll<Questionnaire>,
    rounds: Coll<Round>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<Value>> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = groups
        .delete_one_with_session(group_id.as_doc(), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Group {group_id}")));
    }

    let owned = doc! {
        "group_id": group_id,
    };
    votes
        .delete_many_with_session(owned.clone(), None, &mut session)
        .await?;
    rounds
        .delete_many_with_session(owned.clone(), None, &mut session)
        .await?;
    questionnaires
        .delete_many_with_session(owned.clone(), None, &mut session)
        .await?;
    members
        .delete_many_with_session(owned, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    info!("Deleted group {group_id}");
    Ok(Json(json!({ "success": true })))
}
