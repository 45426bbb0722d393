use log::info;
use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::TryStreamExt,
    serde::json::{json, Json, Value},
    Route,
};

use crate::api::common::{group_by_id, member_in_group};
use crate::error::{Error, Result};
use crate::model::{
    api::member::{MemberDescription, MemberSpec, MemberUpdate},
    db::{
        group::Group,
        member::{Member, NewMember},
        questionnaire::Questionnaire,
        vote::Vote,
    },
    mongodb::{inserted_id, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![list_users, add_member, update_member, remove_member]
}

/// Every member of every group, by name.
#[get("/users")]
async fn list_users(members: Coll<Member>) -> Result<Json<Vec<MemberDescription>>> {
    let by_name = FindOptions::builder().sort(doc! { "name": 1, "_id": 1 }).build();
    let all: Vec<Member> = members.find(None, by_name).await?.try_collect().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

#[post("/groups/<group_id>/members", data = "<spec>", format = "json")]
async fn add_member(
    group_id: Id,
    spec: Json<MemberSpec>,
    groups: Coll<Group>,
    new_members: Coll<NewMember>,
) -> Result<Json<MemberDescription>> {
    let name = spec.0.validate()?;
    group_by_id(&groups, group_id).await?;

    let member = NewMember::new(group_id, name);
    let result = new_members.insert_one(&member, None).await?;
    let member = Member {
        id: inserted_id(result)?,
        member,
    };
    info!("Added member {} ({}) to group {group_id}", member.id, member.name);
    Ok(Json(member.into()))
}

#[patch("/groups/<group_id>/members/<member_id>", data = "<update>", format = "json")]
async fn update_member(
    group_id: Id,
    member_id: Id,
    update: Json<MemberUpdate>,
    members: Coll<Member>,
) -> Result<Json<MemberDescription>> {
    let update = update.0.into_update()?;
    let filter = doc! {
        "_id": member_id,
        "group_id": group_id,
    };
    let result = members.update_one(filter, update, None).await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!(
            "Member {member_id} of group {group_id}"
        )));
    }

    let member = member_in_group(&members, group_id, member_id).await?;
    Ok(Json(member.into()))
}

/// Remove a member from a group. Their questionnaire and votes go with them.
#[delete("/groups/<group_id>/members/<member_id>")]
async fn remove_member(
    group_id: Id,
    member_id: Id,
    members: Coll<Member>,
    questionnaires: Coll<Questionnaire>,
    votes: Coll<Vote>,
) -> Result<Json<Value>> {
    let filter = doc! {
        "_id": member_id,
        "group_id": group_id,
    };
    let result = members.delete_one(filter, None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!(
            "Member {member_id} of group {group_id}"
        )));
    }

    let owned = doc! {
        "member_id": member_id,
        "group_id": group_id,
    };
    questionnaires.delete_many(owned.clone(), None).await?;
    votes.delete_many(owned, None).await?;

    info!("Removed member {member_id} from group {group_id}");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use super::*;
    use crate::api::tests::{create_group_for_spec, parse_ok, post_json};
    use crate::model::api::{
        group::{GroupDescription, GroupSpec},
        questionnaire::QuestionnaireSpec,
    };

    #[backend_test]
    async fn add_and_list(client: Client) {
        let group = create_group_for_spec(&client, &GroupSpec::example()).await;

        let spec = MemberSpec {
            name: Some(" Dee ".into()),
        };
        let dee: MemberDescription = parse_ok(
            post_json(&client, uri!("/api", add_member(*group.id)), &spec).await,
        )
        .await;
        assert_eq!(dee.name, "Dee");
        assert_eq!(dee.group_id, group.id);
        assert!(!dee.questions_generated_animation);

        // New members join at the end.
        let response = client.get(format!("/api/groups/{}", group.id)).dispatch().await;
        let group: GroupDescription = parse_ok(response).await;
        let names: Vec<_> = group.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Ben", "Caz", "Dee"]);

        // Users are listed by name.
        let response = client.get(uri!("/api", list_users)).dispatch().await;
        let users: Vec<MemberDescription> = parse_ok(response).await;
        let names: Vec<_> = users.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Ben", "Caz", "Dee"]);
    }

    #[backend_test]
    async fn bad_add(client: Client) {
        let group = create_group_for_spec(&client, &GroupSpec::example()).await;

        let blank = MemberSpec {
            name: Some("".into()),
        };
        let response = post_json(&client, uri!("/api", add_member(*group.id)), &blank).await;
        assert_eq!(Status::BadRequest, response.status());

        let spec = MemberSpec {
            name: Some("Dee".into()),
        };
        let response = post_json(&client, uri!("/api", add_member(Id::new())), &spec).await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn update(client: Client) {
        let group = create_group_for_spec(&client, &GroupSpec::example()).await;
        let ana = &group.members[0];

        let patch = |member_id: Id, body: Value| {
            client
                .patch(uri!("/api", update_member(*group.id, member_id)))
                .header(ContentType::JSON)
                .body(body.to_string())
                .dispatch()
        };

        let updated: MemberDescription =
            parse_ok(patch(*ana.id, json!({ "questionsGeneratedAnimation": true })).await).await;
        assert!(updated.questions_generated_animation);
        assert_eq!(updated.name, "Ana");

        let updated: MemberDescription =
            parse_ok(patch(*ana.id, json!({ "name": "Anna" })).await).await;
        assert_eq!(updated.name, "Anna");
        assert!(updated.questions_generated_animation);

        assert_eq!(patch(*ana.id, json!({})).await.status(), Status::BadRequest);
        assert_eq!(
            patch(Id::new(), json!({ "name": "Nobody" })).await.status(),
            Status::NotFound
        );
    }

    #[backend_test]
    async fn remove(client: Client, questionnaires: Coll<Questionnaire>, members: Coll<Member>) {
        let group = create_group_for_spec(&client, &GroupSpec::example()).await;
        let ben = &group.members[1];
        let response = post_json(
            &client,
            format!("/api/groups/{}/members/{}/questionnaire", group.id, ben.id),
            &QuestionnaireSpec::example(&["beach"]),
        )
        .await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .delete(uri!("/api", remove_member(*group.id, *ben.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        assert!(members.find_one(ben.id.as_doc(), None).await.unwrap().is_none());
        let left = questionnaires
            .count_documents(doc! { "member_id": *ben.id }, None)
            .await
            .unwrap();
        assert_eq!(left, 0);

        // Removing again finds nothing.
        let response = client
            .delete(uri!("/api", remove_member(*group.id, *ben.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}
