use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::{StreamExt, TryStreamExt},
    serde::json::Json,
    Route,
};

use crate::error::Result;
use crate::model::{
    api::{
        pagination::{Paginated, PaginationRequest},
        survey::SurveySummary,
    },
    db::survey::{active_on, today, Survey},
    mongodb::Coll,
};

/// Path of the catalog endpoint, used in pagination links.
const CATALOG_PATH: &str = "/surveys/";

pub fn routes() -> Vec<Route> {
    routes![active_surveys]
}

#[get("/surveys?<pagination..>")]
async fn active_surveys(
    pagination: PaginationRequest,
    surveys: Coll<Survey>,
) -> Result<Json<Paginated<SurveySummary>>> {
    let filter = active_on(today());

    let options = FindOptions::builder()
        .sort(doc! { "date_start": -1, "_id": 1 })
        .skip(pagination.skip())
        .limit(i64::from(pagination.page_size()))
        .build();

    let page = surveys
        .find(filter.clone(), options)
        .await?
        .map(|survey| survey.map(SurveySummary::from))
        .try_collect::<Vec<_>>()
        .await?;

    let total = surveys.count_documents(filter, None).await?;

    Ok(Json(pagination.to_paginated(CATALOG_PATH, total, page)))
}
