use std::collections::HashSet;

use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::api::common::group_by_id;
use crate::error::Result;
use crate::model::{
    api::recommendation::RecommendationRequest,
    common::destination::{Destination, DestinationCatalogue},
    db::{group::Group, questionnaire::Questionnaire},
    mongodb::{Coll, Id},
};
use crate::Config;

pub fn routes() -> Vec<Route> {
    routes![recommend, recommend_for_group]
}

#[post("/recommend", data = "<request>", format = "json")]
fn recommend(
    request: Json<RecommendationRequest>,
    catalogue: &State<DestinationCatalogue>,
    config: &State<Config>,
) -> Json<Vec<Destination>> {
    let preferences: HashSet<String> = request.0.preferences.into_iter().collect();
    Json(catalogue.recommend(&preferences, config.recommendation_limit()))
}

/// Recommend destinations for the union of the interests the group's members
/// gave in their questionnaires.
#[get("/groups/<group_id>/recommendations")]
async fn recommend_for_group(
    group_id: Id,
    groups: Coll<Group>,
    questionnaires: Coll<Questionnaire>,
    catalogue: &State<DestinationCatalogue>,
    config: &State<Config>,
) -> Result<Json<Vec<Destination>>> {
    group_by_id(&groups, group_id).await?;

    let filter = doc! {
        "group_id": group_id,
    };
    let answered: Vec<Questionnaire> = questionnaires.find(filter, None).await?.try_collect().await?;
    let preferences: HashSet<String> = answered
        .into_iter()
        .flat_map(|questionnaire| questionnaire.questionnaire.interests)
        .collect();
    Ok(Json(
        catalogue.recommend(&preferences, config.recommendation_limit()),
    ))
}
