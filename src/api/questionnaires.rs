use log::info;
use mongodb::bson::doc;
use rocket::{response::status::NoContent, serde::json::Json, Route};

use crate::api::common::member_in_group;
use crate::error::{Error, Result};
use crate::model::{
    api::questionnaire::{QuestionnaireDescription, QuestionnaireSpec},
    db::{
        member::Member,
        questionnaire::{NewQuestionnaire, Questionnaire},
    },
    mongodb::{inserted_id, is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![submit_questionnaire, get_questionnaire]
}

/// A member's questionnaire, or nothing if they have not filled it in yet.
#[derive(Responder)]
pub enum MaybeQuestionnaire {
    Found(Json<QuestionnaireDescription>),
    Missing(NoContent),
}

#[post(
    "/groups/<group_id>/members/<member_id>/questionnaire",
    data = "<spec>",
    format = "json"
)]
async fn submit_questionnaire(
    group_id: Id,
    member_id: Id,
    spec: Json<QuestionnaireSpec>,
    members: Coll<Member>,
    new_questionnaires: Coll<NewQuestionnaire>,
) -> Result<Json<QuestionnaireDescription>> {
    member_in_group(&members, group_id, member_id).await?;
    let questionnaire = spec.0.into_questionnaire(member_id, group_id)?;

    let id = match new_questionnaires.insert_one(&questionnaire, None).await {
        Ok(result) => inserted_id(result)?,
        Err(e) if is_duplicate_key_error(&e) => {
            return Err(Error::conflict(format!(
                "Member {member_id} has already answered the questionnaire"
            )));
        }
        Err(e) => return Err(e.into()),
    };
    info!("Member {member_id} of group {group_id} answered the questionnaire");

    let questionnaire = Questionnaire { id, questionnaire };
    Ok(Json(questionnaire.into()))
}

#[get("/groups/<group_id>/members/<member_id>/questionnaire")]
async fn get_questionnaire(
    group_id: Id,
    member_id: Id,
    questionnaires: Coll<Questionnaire>,
) -> Result<MaybeQuestionnaire> {
    let filter = doc! {
        "member_id": member_id,
        "group_id": group_id,
    };
    Ok(match questionnaires.find_one(filter, None).await? {
        Some(questionnaire) => MaybeQuestionnaire::Found(Json(questionnaire.into())),
        None => MaybeQuestionnaire::Missing(NoContent),
    })
}
