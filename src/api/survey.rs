use log::debug;
use mongodb::{
    bson::doc,
    options::FindOneOptions,
    Client,
};
use rocket::{
    serde::json::{self, Json},
    Route, State,
};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        answer::AnswerSubmission,
        question::{QuestionLookup, QuestionView},
    },
    common::{
        navigation::{parse_requested, Position},
        Actor, SurveyId,
    },
    db::{
        answer::{Answer, AnswerCore},
        question::Question,
        survey::{active_on, today, Survey},
    },
    mongodb::{u32_id_filter, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![survey_question, submit_answer]
}

/// A single question of an active survey, by 1-based position.
///
/// Anything that cannot be resolved to a question is answered with `{}`.
#[get("/survey?<survey_id>&<question>")]
async fn survey_question(
    survey_id: Option<SurveyId>,
    question: Option<&str>,
    surveys: Coll<Survey>,
    questions: Coll<Question>,
) -> Result<Json<QuestionLookup>> {
    let Some(survey_id) = survey_id else {
        return Ok(Json(QuestionLookup::Missing {}));
    };

    let mut active = active_on(today());
    active.insert("_id", survey_id);
    if surveys.find_one(active, None).await?.is_none() {
        debug!("Survey {survey_id} does not exist or is not active");
        return Ok(Json(QuestionLookup::Missing {}));
    }

    let in_survey = doc! { "survey_id": survey_id };
    let count = questions.count_documents(in_survey.clone(), None).await?;
    let Some(position) = Position::clamped(question.and_then(parse_requested), count) else {
        return Ok(Json(QuestionLookup::Missing {}));
    };

    let options = FindOneOptions::builder()
        .sort(doc! { "_id": 1 })
        .skip(position.skip())
        .build();
    let lookup = match questions.find_one(in_survey, options).await? {
        Some(question) => QuestionLookup::Found(QuestionView::new(question, position)),
        // Questions were deleted between counting and fetching.
        None => QuestionLookup::Missing {},
    };
    Ok(Json(lookup))
}

/// Record an answer, replacing any earlier answer by the same actor to the same question.
#[post("/survey", data = "<submission>")]
async fn submit_answer(
    actor: Actor,
    submission: std::result::Result<Json<AnswerSubmission>, json::Error<'_>>,
    questions: Coll<Question>,
    answers: Coll<Answer>,
    db_client: &State<Client>,
) -> Result<()> {
    let submission = submission
        .map_err(|e| Error::not_acceptable(format!("Malformed answer: {e}")))?
        .into_inner();

    let question = questions
        .find_one(u32_id_filter(submission.question_id), None)
        .await?
        .ok_or_else(|| {
            Error::not_acceptable(format!("No question with ID {}", submission.question_id))
        })?;

    let answer = AnswerCore::verify(actor, &question, submission)?;
    Answer::record(&answers, db_client, answer).await?;
    Ok(())
}
