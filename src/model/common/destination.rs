use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A destination that can be recommended to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Display name, also used as the candidate name when voting.
    pub name: String,
    /// IATA code of the destination airport.
    pub iata: String,
    /// Interest tags describing the destination.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// The set of destinations known to the server, loaded once at ignition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DestinationCatalogue(Vec<Destination>);

impl DestinationCatalogue {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self(destinations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rank destinations by how many of their categories appear in
    /// `preferences`, best first, keeping at most `limit`.
    ///
    /// Destinations matching nothing are left out, and each returned
    /// destination only lists its matching categories. Ties keep catalogue order.
    pub fn recommend(&self, preferences: &HashSet<String>, limit: usize) -> Vec<Destination> {
        let mut matches: Vec<Destination> = self
            .0
            .iter()
            .filter_map(|destination| {
                let categories: Vec<String> = destination
                    .categories
                    .iter()
                    .filter(|category| preferences.contains(*category))
                    .cloned()
                    .collect();
                (!categories.is_empty()).then(|| Destination {
                    name: destination.name.clone(),
                    iata: destination.iata.clone(),
                    categories,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.categories.len().cmp(&a.categories.len()));
        matches.truncate(limit);
        matches
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Destination {
        pub fn example(name: &str, iata: &str, categories: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                iata: iata.to_string(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    impl DestinationCatalogue {
        pub fn example() -> Self {
            Self::new(vec![
                Destination::example("Paris", "CDG", &["culture", "food", "romance"]),
                Destination::example("Reykjavik", "KEF", &["nature", "adventure"]),
                Destination::example("Rome", "FCO", &["culture", "food", "history"]),
                Destination::example("Queenstown", "ZQN", &["adventure", "nature", "ski"]),
                Destination::example("Ibiza", "IBZ", &["beach", "nightlife"]),
            ])
        }
    }
}
