use serde::{Deserialize, Serialize};

/// A request for destinations matching a set of interests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub preferences: Vec<String>,
}
