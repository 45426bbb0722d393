use std::path::PathBuf;

use log::{error, info, warn};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    serde::json,
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    common::{
        destination::DestinationCatalogue,
        round::{RoundNumber, DEFAULT_ESCALATION_THRESHOLD},
    },
    mongodb::ensure_indexes_exist,
};

const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_escalation_threshold")]
    round_escalation_threshold: RoundNumber,
    #[serde(default = "default_recommendation_limit")]
    recommendation_limit: usize,
}

fn default_escalation_threshold() -> RoundNumber {
    DEFAULT_ESCALATION_THRESHOLD
}

fn default_recommendation_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

impl Config {
    /// Rounds with this number or higher are settled by coin toss when no
    /// candidate is unanimous.
    pub fn round_escalation_threshold(&self) -> RoundNumber {
        self.round_escalation_threshold
    }

    /// Maximum number of destinations returned by a recommendation.
    pub fn recommendation_limit(&self) -> usize {
        self.recommendation_limit
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            round_escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.round_escalation_threshold == 0 {
            error!("round_escalation_threshold must be at least 1");
            return Err(rocket);
        }
        info!(
            "Rounds escalate to a coin toss from round {}",
            config.round_escalation_threshold
        );

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes exist, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to set up database indexes: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn get_database_name() -> String {
    "tripvote".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

/// Configuration for the destination catalogue.
#[derive(Deserialize)]
struct DestinationsConfig {
    // non-secrets
    #[serde(default)]
    destinations_file: Option<PathBuf>,
}

/// A fairing that loads the destination catalogue from the JSON file named
/// by `destinations_file` and places it into managed state. Without a file
/// the catalogue is empty and recommendations come back empty.
pub struct DestinationsFairing;

#[rocket::async_trait]
impl Fairing for DestinationsFairing {
    fn info(&self) -> Info {
        Info {
            name: "Destination catalogue",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DestinationsConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load destinations config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let catalogue = match config.destinations_file {
            None => {
                warn!("No destinations_file configured, recommendations will be empty");
                DestinationCatalogue::default()
            }
            Some(path) => {
                let raw = match rocket::tokio::fs::read_to_string(&path).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        error!("Failed to read {}: {e}", path.display());
                        return Err(rocket);
                    }
                };
                match json::from_str::<DestinationCatalogue>(&raw) {
                    Ok(catalogue) => catalogue,
                    Err(e) => {
                        error!("Failed to parse {}: {e}", path.display());
                        return Err(rocket);
                    }
                }
            }
        };
        info!("Loaded {} destinations", catalogue.len());

        // Manage the state.
        rocket = rocket.manage(catalogue);
        Ok(rocket)
    }
}
