use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    admin::Admin, answer::Answer, question::Question, survey::Survey, user::User,
};

use super::counter::Counter;

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

impl MongoCollection for Admin {
    const NAME: &'static str = "admins";
}

impl MongoCollection for User {
    const NAME: &'static str = "users";
}

impl MongoCollection for Survey {
    const NAME: &'static str = "surveys";
}

impl MongoCollection for Question {
    const NAME: &'static str = "questions";
}

impl MongoCollection for Answer {
    const NAME: &'static str = "answers";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Account collections.
    let username_index = IndexModel::builder()
        .keys(doc! {"username": 1})
        .options(unique.clone())
        .build();
    Coll::<Admin>::from_db(db)
        .create_index(username_index.clone(), None)
        .await?;
    Coll::<User>::from_db(db)
        .create_index(username_index, None)
        .await?;

    // Surveys are listed by start date.
    let survey_index = IndexModel::builder()
        .keys(doc! {"date_start": -1, "_id": 1})
        .build();
    Coll::<Survey>::from_db(db)
        .create_index(survey_index, None)
        .await?;

    // Questions are walked in ID order within a survey; choices are looked up by ID.
    let question_index = IndexModel::builder()
        .keys(doc! {"survey_id": 1, "_id": 1})
        .build();
    let choice_index = IndexModel::builder()
        .keys(doc! {"choices.id": 1})
        .build();
    let questions = Coll::<Question>::from_db(db);
    questions.create_index(question_index, None).await?;
    questions.create_index(choice_index, None).await?;

    // At most one live answer per actor and question.
    let answer_index = IndexModel::builder()
        .keys(doc! {"question_id": 1, "actor": 1})
        .options(unique)
        .build();
    Coll::<Answer>::from_db(db)
        .create_index(answer_index, None)
        .await?;

    Ok(())
}
