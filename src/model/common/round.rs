use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Round numbers start at 1 and increase by one per round within a group.
pub type RoundNumber = u32;
/// Candidates (places) are identified by name.
pub type CandidateId = String;

/// The round number from which an undecided round is settled by coin toss.
pub const DEFAULT_ESCALATION_THRESHOLD: RoundNumber = 5;

/// States in the voting round lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    /// Accepting votes.
    Open,
    /// Resolved, either with a unanimous winner or with no winner at all.
    Closed,
    /// Resolved by picking a random candidate.
    CoinToss,
}

impl RoundStatus {
    /// Is this round still accepting votes?
    pub fn is_open(&self) -> bool {
        *self == RoundStatus::Open
    }
}

impl From<RoundStatus> for Bson {
    fn from(status: RoundStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(Bson::from(RoundStatus::Open), Bson::String("OPEN".into()));
        assert_eq!(Bson::from(RoundStatus::Closed), Bson::String("CLOSED".into()));
        assert_eq!(
            Bson::from(RoundStatus::CoinToss),
            Bson::String("COIN_TOSS".into())
        );
    }
}
