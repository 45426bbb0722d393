use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, results::InsertOneResult,
    Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::error::{self, Error};
use crate::model::{
    common::round::RoundStatus,
    db::{
        group::{Group, NewGroup},
        member::{Member, NewMember},
        questionnaire::{NewQuestionnaire, Questionnaire},
        round::{NewRound, Round},
        vote::{NewVote, Vote},
    },
    mongodb::Id,
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

/// Extract the ID the database assigned to a freshly inserted document.
pub fn inserted_id(result: InsertOneResult) -> error::Result<Id> {
    result
        .inserted_id
        .as_object_id()
        .map(Id::from)
        .ok_or_else(|| {
            Error::Unexpected(format!(
                "Inserted ID {} is not an ObjectId",
                result.inserted_id
            ))
        })
}

// Group collections
const GROUPS: &str = "groups";
impl MongoCollection for Group {
    const NAME: &'static str = GROUPS;
}
impl MongoCollection for NewGroup {
    const NAME: &'static str = GROUPS;
}

// Member collections
const MEMBERS: &str = "members";
impl MongoCollection for Member {
    const NAME: &'static str = MEMBERS;
}
impl MongoCollection for NewMember {
    const NAME: &'static str = MEMBERS;
}

// Questionnaire collections
const QUESTIONNAIRES: &str = "questionnaires";
impl MongoCollection for Questionnaire {
    const NAME: &'static str = QUESTIONNAIRES;
}
impl MongoCollection for NewQuestionnaire {
    const NAME: &'static str = QUESTIONNAIRES;
}

// Voting round collections
const ROUNDS: &str = "rounds";
impl MongoCollection for Round {
    const NAME: &'static str = ROUNDS;
}
impl MongoCollection for NewRound {
    const NAME: &'static str = ROUNDS;
}

// Vote collections
const VOTES: &str = "votes";
impl MongoCollection for Vote {
    const NAME: &'static str = VOTES;
}
impl MongoCollection for NewVote {
    const NAME: &'static str = VOTES;
}

/// Ensure that all the required indexes exist on the given database.
///
/// The unique indexes here back business rules: group names are unique,
/// each member fills in one questionnaire per group, round numbers are never
/// reused, a group has at most one open round, and a member has one vote per
/// candidate per round.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Group collection.
    let group_index = IndexModel::builder()
        .keys(doc! {"name": 1})
        .options(unique.clone())
        .build();
    Coll::<Group>::from_db(db)
        .create_index(group_index, None)
        .await?;

    // Member collection.
    let member_index = IndexModel::builder().keys(doc! {"group_id": 1}).build();
    Coll::<Member>::from_db(db)
        .create_index(member_index, None)
        .await?;

    // Questionnaire collection.
    let questionnaire_index = IndexModel::builder()
        .keys(doc! {"member_id": 1, "group_id": 1})
        .options(unique.clone())
        .build();
    Coll::<Questionnaire>::from_db(db)
        .create_index(questionnaire_index, None)
        .await?;

    // Round collection.
    let round_number_index = IndexModel::builder()
        .keys(doc! {"group_id": 1, "number": 1})
        .options(unique.clone())
        .build();
    let open_round_index = IndexModel::builder()
        .keys(doc! {"group_id": 1})
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(doc! {"status": RoundStatus::Open})
                .build(),
        )
        .build();
    Coll::<Round>::from_db(db)
        .create_indexes([round_number_index, open_round_index], None)
        .await?;

    // Vote collection.
    let vote_index = IndexModel::builder()
        .keys(doc! {"member_id": 1, "round_id": 1, "place": 1})
        .options(unique)
        .build();
    let vote_round_index = IndexModel::builder().keys(doc! {"round_id": 1}).build();
    Coll::<Vote>::from_db(db)
        .create_indexes([vote_index, vote_round_index], None)
        .await?;

    Ok(())
}
