//! Round resolution: deciding the outcome of a voting round from its votes.
//!
//! This is independent of the database so that the rules can be checked in
//! isolation. The caller is responsible for loading the votes and the group's
//! *current* membership, and for persisting the outcome.

use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::model::{
    common::round::{CandidateId, RoundNumber, RoundStatus},
    db::vote::VoteCore,
    mongodb::Id,
};

/// The final state of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: RoundStatus,
    pub winner: Option<CandidateId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Round {0} has no candidates to choose from")]
    NoCandidates(RoundNumber),
}

/// The distinct candidates that received at least one vote, in order of first
/// appearance among `votes`.
pub fn candidates(votes: &[VoteCore]) -> Vec<&str> {
    let mut seen = HashSet::new();
    votes
        .iter()
        .map(|vote| vote.place.as_str())
        .filter(|place| seen.insert(*place))
        .collect()
}

/// The first candidate (in order of first appearance) for which every member
/// has cast a `true` vote. Members who did not vote count against unanimity,
/// and a group with no members has no unanimous candidate.
pub fn unanimous_winner<'v>(votes: &'v [VoteCore], members: &[Id]) -> Option<&'v str> {
    if members.is_empty() {
        return None;
    }
    let approvals: HashSet<(&Id, &str)> = votes
        .iter()
        .filter(|vote| vote.value)
        .map(|vote| (&vote.member_id, vote.place.as_str()))
        .collect();
    candidates(votes).into_iter().find(|place| {
        members
            .iter()
            .all(|member| approvals.contains(&(member, *place)))
    })
}

/// Resolve a round.
///
/// A unanimous candidate wins outright. Otherwise rounds numbered below
/// `threshold` close without a winner, and later rounds pick a winner
/// uniformly at random from the candidates that received any vote.
pub fn resolve<R: Rng + ?Sized>(
    number: RoundNumber,
    votes: &[VoteCore],
    members: &[Id],
    threshold: RoundNumber,
    rng: &mut R,
) -> Result<Resolution, ResolutionError> {
    if let Some(winner) = unanimous_winner(votes, members) {
        return Ok(Resolution {
            status: RoundStatus::Closed,
            winner: Some(winner.to_string()),
        });
    }

    if number < threshold {
        return Ok(Resolution {
            status: RoundStatus::Closed,
            winner: None,
        });
    }

    let winner = candidates(votes)
        .choose(rng)
        .map(|place| place.to_string())
        .ok_or(ResolutionError::NoCandidates(number))?;
    Ok(Resolution {
        status: RoundStatus::CoinToss,
        winner: Some(winner),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    const THRESHOLD: RoundNumber = 5;

    fn members(n: usize) -> Vec<Id> {
        (0..n).map(|_| Id::new()).collect()
    }

    fn vote(member: Id, place: &str, value: bool) -> VoteCore {
        VoteCore::example(member, place, value)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn unanimous_yes_wins() {
        let group = members(3);
        let votes: Vec<_> = group.iter().map(|m| vote(*m, "Paris", true)).collect();

        let resolution = resolve(1, &votes, &group, THRESHOLD, &mut rng()).unwrap();
        assert_eq!(resolution.status, RoundStatus::Closed);
        assert_eq!(resolution.winner.as_deref(), Some("Paris"));
    }

    #[test]
    fn split_vote_closes_without_winner() {
        let group = members(3);
        let votes = vec![
            vote(group[0], "Paris", true),
            vote(group[1], "Paris", false),
            vote(group[2], "Rome", true),
        ];

        let resolution = resolve(1, &votes, &group, THRESHOLD, &mut rng()).unwrap();
        assert_eq!(resolution.status, RoundStatus::Closed);
        assert_eq!(resolution.winner, None);
    }

    #[test]
    fn split_vote_at_threshold_is_coin_toss() {
        let group = members(3);
        let votes = vec![
            vote(group[0], "Paris", true),
            vote(group[1], "Paris", false),
            vote(group[2], "Rome", true),
        ];

        for number in [THRESHOLD, THRESHOLD + 3] {
            let resolution = resolve(number, &votes, &group, THRESHOLD, &mut rng()).unwrap();
            assert_eq!(resolution.status, RoundStatus::CoinToss);
            let winner = resolution.winner.unwrap();
            assert!(winner == "Paris" || winner == "Rome");
        }
    }

    #[test]
    fn coin_toss_is_reproducible_with_seed() {
        let group = members(2);
        let votes = vec![
            vote(group[0], "Lisbon", true),
            vote(group[1], "Oslo", true),
            vote(group[0], "Kyoto", false),
        ];

        let first = resolve(5, &votes, &group, THRESHOLD, &mut rng()).unwrap();
        let second = resolve(5, &votes, &group, THRESHOLD, &mut rng()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn coin_toss_reaches_every_candidate() {
        let group = members(2);
        let votes = vec![
            vote(group[0], "Lisbon", true),
            vote(group[1], "Oslo", true),
            vote(group[0], "Kyoto", false),
        ];

        let mut rng = rng();
        let winners: HashSet<_> = (0..200)
            .map(|_| {
                resolve(5, &votes, &group, THRESHOLD, &mut rng)
                    .unwrap()
                    .winner
                    .unwrap()
            })
            .collect();
        let expected: HashSet<_> = ["Lisbon", "Oslo", "Kyoto"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(winners, expected);
    }

    #[test]
    fn unanimity_beats_coin_toss() {
        let group = members(2);
        let votes = vec![
            vote(group[0], "Rome", true),
            vote(group[0], "Paris", true),
            vote(group[1], "Paris", true),
        ];

        let resolution = resolve(7, &votes, &group, THRESHOLD, &mut rng()).unwrap();
        assert_eq!(resolution.status, RoundStatus::Closed);
        assert_eq!(resolution.winner.as_deref(), Some("Paris"));
    }

    #[test]
    fn first_unanimous_candidate_wins() {
        let group = members(2);
        let votes = vec![
            vote(group[0], "Rome", true),
            vote(group[1], "Paris", true),
            vote(group[0], "Paris", true),
            vote(group[1], "Rome", true),
        ];

        // Both are unanimous; Rome appeared first.
        assert_eq!(unanimous_winner(&votes, &group), Some("Rome"));
    }

    #[test]
    fn absence_is_not_consent() {
        let group = members(3);
        let votes = vec![vote(group[0], "Paris", true), vote(group[1], "Paris", true)];

        assert_eq!(unanimous_winner(&votes, &group), None);
    }

    #[test]
    fn late_member_breaks_unanimity() {
        let mut group = members(2);
        let votes: Vec<_> = group.iter().map(|m| vote(*m, "Paris", true)).collect();
        assert_eq!(unanimous_winner(&votes, &group), Some("Paris"));

        group.push(Id::new());
        assert_eq!(unanimous_winner(&votes, &group), None);
    }

    #[test]
    fn votes_from_former_members_are_ignored() {
        let group = members(2);
        let departed = Id::new();
        let votes = vec![
            vote(departed, "Rome", false),
            vote(group[0], "Rome", true),
            vote(group[1], "Rome", true),
        ];

        assert_eq!(unanimous_winner(&votes, &group), Some("Rome"));
    }

    #[test]
    fn no_members_means_no_winner() {
        let votes = vec![vote(Id::new(), "Paris", true)];
        assert_eq!(unanimous_winner(&votes, &[]), None);
    }

    #[test]
    fn empty_round_before_threshold_has_no_winner() {
        let resolution = resolve(2, &[], &members(3), THRESHOLD, &mut rng()).unwrap();
        assert_eq!(resolution.status, RoundStatus::Closed);
        assert_eq!(resolution.winner, None);
    }

    #[test]
    fn empty_round_at_threshold_fails() {
        let result = resolve(5, &[], &members(3), THRESHOLD, &mut rng());
        assert_eq!(result, Err(ResolutionError::NoCandidates(5)));
    }

    #[test]
    fn winner_iff_some_candidate_has_every_yes() {
        let group = members(4);
        let places = ["Paris", "Rome", "Oslo"];
        let mut rng = rng();
        for _ in 0..100 {
            let votes: Vec<_> = group
                .iter()
                .flat_map(|m| places.iter().map(move |p| (*m, *p)))
                .filter_map(|(m, p)| {
                    let voted = rng.gen_bool(0.8);
                    voted.then(|| vote(m, p, rng.gen_bool(0.8)))
                })
                .collect();
            let expected = places.iter().any(|p| {
                let yes: HashSet<_> = votes
                    .iter()
                    .filter(|v| v.place == *p && v.value)
                    .map(|v| v.member_id)
                    .collect();
                yes.len() == group.len()
            });

            let resolution = resolve(1, &votes, &group, THRESHOLD, &mut rng).unwrap();
            assert_eq!(resolution.winner.is_some(), expected);
        }
    }

    #[test]
    fn candidates_keep_first_appearance_order() {
        let member = Id::new();
        let votes = vec![
            vote(member, "Oslo", false),
            vote(member, "Paris", true),
            vote(Id::new(), "Oslo", true),
            vote(member, "Kyoto", true),
        ];
        assert_eq!(candidates(&votes), vec!["Oslo", "Paris", "Kyoto"]);
    }
}
