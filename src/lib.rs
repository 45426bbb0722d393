#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, DestinationsFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod tie_breaker;

pub use config::Config;
pub use tie_breaker::TieBreaker;

/// Build the server: configuration, database, destination catalogue and
/// the API mounted under `/api`.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(DestinationsFairing)
        .manage(TieBreaker::from_entropy())
        .mount("/api", api::routes())
}

#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|e| panic!("Could not connect to database with `db_uri` {db_uri:?}: {e}"))
}

/// A server backed by the given database, with a fixed destination catalogue
/// and the given tie breaker.
#[cfg(test)]
async fn rocket_for_db(
    db_client: mongodb::Client,
    db_name: &str,
    tie_breaker: TieBreaker,
) -> Rocket<Build> {
    let db = db_client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create indexes");
    rocket::build()
        .attach(ConfigFairing)
        .manage(model::common::destination::DestinationCatalogue::example())
        .manage(tie_breaker)
        .manage(db_client)
        .manage(db)
        .mount("/api", api::routes())
}
