use std::ops::Range;

use mongodb::{
    bson::{doc, to_bson, Bson},
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// The auto-increment sequences we maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterId {
    Surveys,
    Questions,
    Choices,
}

impl CounterId {
    pub const ALL: [CounterId; 3] = [Self::Surveys, Self::Questions, Self::Choices];
}

impl From<CounterId> for Bson {
    fn from(id: CounterId) -> Self {
        to_bson(&id).expect("Serialisation is infallible")
    }
}

/// A counter object used to implement auto-increment fields.
///
/// IDs handed out by a counter strictly increase, so sorting by ID
/// recovers creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: CounterId,
    pub next: u32,
}

impl Counter {
    /// Create a new `Counter` starting at the given value.
    pub fn new(id: CounterId, start: u32) -> Self {
        Self { id, next: start }
    }

    /// Atomically retrieve the next value of the given counter.
    pub async fn next(counters: &Coll<Counter>, id: CounterId) -> Result<u32> {
        Ok(Self::reserve(counters, id, 1).await?.start)
    }

    /// Atomically reserve `count` consecutive values of the given counter.
    pub async fn reserve(counters: &Coll<Counter>, id: CounterId, count: u32) -> Result<Range<u32>> {
        let update = doc! {
            "$inc": { "next": count }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::not_found(format!("Counter {id:?}")))?;
        Ok(counter.next..counter.next + count)
    }
}

/// Ensure every counter exists, starting at 1.
///
/// This operation is idempotent and never resets an existing counter.
pub async fn ensure_counters_exist(counters: &Coll<Counter>) -> std::result::Result<(), DbError> {
    let upsert = UpdateOptions::builder().upsert(true).build();
    for id in CounterId::ALL {
        let insert = doc! {
            "$setOnInsert": { "next": 1 }
        };
        counters
            .update_one(doc! { "_id": id }, insert, upsert.clone())
            .await?;
    }
    Ok(())
}
