use rocket::{
    serde::json::{json, Json, Value},
    Route,
};

mod common;
pub mod groups;
pub mod members;
pub mod questionnaires;
pub mod recommendations;
pub mod rounds;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![hello];
    routes.extend(groups::routes());
    routes.extend(members::routes());
    routes.extend(questionnaires::routes());
    routes.extend(rounds::routes());
    routes.extend(recommendations::routes());
    routes
}

/// Liveness check.
#[get("/hello")]
fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello from the tripvote backend!" }))
}

/// Helpers shared by the endpoint tests.
#[cfg(test)]
pub(crate) mod tests {
    use std::fmt::Display;

    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };
    use serde::{de::DeserializeOwned, Serialize};

    use crate::model::{
        api::{group::GroupDescription, group::GroupSpec, round::RoundDescription},
        mongodb::Id,
    };

    pub async fn post_json<'c>(
        client: &'c Client,
        uri: impl Display,
        body: &impl Serialize,
    ) -> LocalResponse<'c> {
        client
            .post(uri.to_string())
            .header(ContentType::JSON)
            .body(serde_json::to_string(body).unwrap())
            .dispatch()
            .await
    }

    /// Parse a successful JSON response.
    pub async fn parse_ok<T: DeserializeOwned>(response: LocalResponse<'_>) -> T {
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    pub async fn create_group_for_spec(client: &Client, spec: &GroupSpec) -> GroupDescription {
        parse_ok(post_json(client, "/api/groups", spec).await).await
    }

    pub async fn open_round(client: &Client, group_id: Id) -> RoundDescription {
        let response = client
            .post(format!("/api/groups/{group_id}/rounds"))
            .dispatch()
            .await;
        parse_ok(response).await
    }

    #[backend_test]
    async fn hello(client: Client) {
        let response = client.get("/api/hello").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(response.into_string().await.unwrap().contains("Hello"));
    }
}
