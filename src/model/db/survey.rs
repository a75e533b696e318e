use std::ops::Deref;

use chrono::{Local, NaiveDate};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::model::common::SurveyId;

/// Core survey data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyCore {
    pub name: String,
    pub description: String,
    /// First day the survey is open. A survey without one is never open.
    pub date_start: Option<NaiveDate>,
    /// Last day the survey is open. A survey without one is never open.
    pub date_end: Option<NaiveDate>,
}

/// A survey from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: SurveyId,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

/// Today's date, in server-local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Filter matching surveys open on the given day.
///
/// Dates are stored as ISO-8601 strings, which sort chronologically; a null date
/// never satisfies a string comparison.
pub fn active_on(day: NaiveDate) -> Document {
    let day = day.to_string();
    doc! {
        "date_start": { "$lte": day.as_str() },
        "date_end": { "$gte": day.as_str() },
    }
}
