use log::info;
use mongodb::{
    bson::doc,
    options::FindOptions,
    Client,
};
use rocket::{
    futures::{StreamExt, TryStreamExt},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            pagination::{Paginated, PaginationRequest},
            question::{ChoiceSpec, ChoiceView, QuestionDescription, QuestionSpec},
            survey::{SurveyDescription, SurveySpec},
        },
        common::{QuestionId, SurveyId},
        db::{
            admin::Admin,
            answer::Answer,
            question::{Choice, Question},
            survey::{Survey, SurveyCore},
        },
        mongodb::{u32_id_filter, Coll, Counter, CounterId},
    },
};

/// Path of the admin survey listing, used in pagination links.
const ADMIN_SURVEYS_PATH: &str = "/admin/surveys";

pub fn routes() -> Vec<Route> {
    routes![
        get_surveys,
        create_survey,
        modify_survey,
        delete_survey,
        get_questions,
        create_question,
        delete_question,
        add_choice,
    ]
}

#[get("/admin/surveys?<pagination..>")]
async fn get_surveys(
    _token: AuthToken<Admin>,
    pagination: PaginationRequest,
    surveys: Coll<Survey>,
) -> Result<Json<Paginated<SurveyDescription>>> {
    let options = FindOptions::builder()
        .sort(doc! { "_id": 1 })
        .skip(pagination.skip())
        .limit(i64::from(pagination.page_size()))
        .build();

    let page = surveys
        .find(None, options)
        .await?
        .map(|survey| survey.map(SurveyDescription::from))
        .try_collect::<Vec<_>>()
        .await?;

    let total = surveys.count_documents(None, None).await?;

    Ok(Json(pagination.to_paginated(ADMIN_SURVEYS_PATH, total, page)))
}

#[post("/admin/surveys", data = "<spec>", format = "json")]
async fn create_survey(
    _token: AuthToken<Admin>,
    spec: Json<SurveySpec>,
    surveys: Coll<Survey>,
    counters: Coll<Counter>,
) -> Result<Json<SurveyDescription>> {
    let survey: SurveyCore = spec.into_inner().try_into()?;
    let survey = Survey {
        id: Counter::next(&counters, CounterId::Surveys).await?,
        survey,
    };
    surveys.insert_one(&survey, None).await?;
    info!("Created survey {} '{}'", survey.id, survey.name);

    Ok(Json(survey.into()))
}

#[put("/admin/surveys/<survey_id>", data = "<spec>", format = "json")]
async fn modify_survey(
    _token: AuthToken<Admin>,
    survey_id: SurveyId,
    spec: Json<SurveySpec>,
    surveys: Coll<Survey>,
) -> Result<Json<SurveyDescription>> {
    let survey = Survey {
        id: survey_id,
        survey: spec.into_inner().try_into()?,
    };
    let result = surveys
        .replace_one(u32_id_filter(survey_id), &survey, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Survey {survey_id}")));
    }

    Ok(Json(survey.into()))
}

/// Delete a survey along with its questions and every answer to them.
#[delete("/admin/surveys/<survey_id>")]
async fn delete_survey(
    _token: AuthToken<Admin>,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
    questions: Coll<Question>,
    answers: Coll<Answer>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let deleted = surveys
        .delete_one_with_session(u32_id_filter(survey_id), None, &mut session)
        .await?
        .deleted_count;
    if deleted == 0 {
        return Err(Error::not_found(format!("Survey {survey_id}")));
    }

    let in_survey = doc! { "survey_id": survey_id };
    let question_ids = questions
        .distinct_with_session("_id", in_survey.clone(), None, &mut session)
        .await?;
    let answers_deleted = answers
        .delete_many_with_session(
            doc! { "question_id": { "$in": question_ids } },
            None,
            &mut session,
        )
        .await?
        .deleted_count;
    let questions_deleted = questions
        .delete_many_with_session(in_survey, None, &mut session)
        .await?
        .deleted_count;

    session.commit_transaction().await?;
    info!(
        "Deleted survey {survey_id} with {questions_deleted} question(s) and {answers_deleted} answer(s)"
    );
    Ok(())
}

#[get("/admin/surveys/<survey_id>/questions")]
async fn get_questions(
    _token: AuthToken<Admin>,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
    questions: Coll<Question>,
) -> Result<Json<Vec<QuestionDescription>>> {
    if surveys
        .find_one(u32_id_filter(survey_id), None)
        .await?
        .is_none()
    {
        return Err(Error::not_found(format!("Survey {survey_id}")));
    }

    // Ordinal order.
    let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let survey_questions: Vec<_> = questions
        .find(doc! { "survey_id": survey_id }, options)
        .await?
        .map(|question| question.map(QuestionDescription::from))
        .try_collect()
        .await?;

    Ok(Json(survey_questions))
}

#[post("/admin/surveys/<survey_id>/questions", data = "<spec>", format = "json")]
async fn create_question(
    _token: AuthToken<Admin>,
    survey_id: SurveyId,
    spec: Json<QuestionSpec>,
    surveys: Coll<Survey>,
    questions: Coll<Question>,
    counters: Coll<Counter>,
) -> Result<Json<QuestionDescription>> {
    spec.validate()?;
    if surveys
        .find_one(u32_id_filter(survey_id), None)
        .await?
        .is_none()
    {
        return Err(Error::not_found(format!("Survey {survey_id}")));
    }

    let question_id = Counter::next(&counters, CounterId::Questions).await?;
    let choice_count = u32::try_from(spec.choices.len())
        .map_err(|_| Error::bad_request("Too many choices".to_string()))?;
    let first_choice = if choice_count > 0 {
        Counter::reserve(&counters, CounterId::Choices, choice_count)
            .await?
            .start
    } else {
        0
    };

    let question = spec
        .into_inner()
        .into_question(question_id, survey_id, first_choice);
    questions.insert_one(&question, None).await?;
    info!("Created question {question_id} in survey {survey_id}");

    Ok(Json(question.into()))
}

/// Delete a question along with every answer to it.
#[delete("/admin/questions/<question_id>")]
async fn delete_question(
    _token: AuthToken<Admin>,
    question_id: QuestionId,
    questions: Coll<Question>,
    answers: Coll<Answer>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let deleted = questions
        .delete_one_with_session(u32_id_filter(question_id), None, &mut session)
        .await?
        .deleted_count;
    if deleted == 0 {
        return Err(Error::not_found(format!("Question {question_id}")));
    }
    answers
        .delete_many_with_session(doc! { "question_id": question_id }, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

#[post("/admin/questions/<question_id>/choices", data = "<spec>", format = "json")]
async fn add_choice(
    _token: AuthToken<Admin>,
    question_id: QuestionId,
    spec: Json<ChoiceSpec>,
    questions: Coll<Question>,
    counters: Coll<Counter>,
) -> Result<Json<ChoiceView>> {
    let question = questions
        .find_one(u32_id_filter(question_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Question {question_id}")))?;

    if !question.answer_type.has_choices() {
        return Err(Error::bad_request(format!(
            "Question {question_id} is a text question and cannot have choices"
        )));
    }
    if spec.title.trim().is_empty() {
        return Err(Error::bad_request("Choice title must not be empty".to_string()));
    }

    let choice = Choice {
        id: Counter::next(&counters, CounterId::Choices).await?,
        title: spec.into_inner().title,
    };
    let push = doc! {
        "$push": { "choices": { "id": choice.id, "title": &choice.title } }
    };
    questions
        .update_one(u32_id_filter(question_id), push, None)
        .await?;

    Ok(Json(choice.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json},
    };

    use super::*;
    use crate::model::{
        api::answer::AnswerSubmission,
        common::{Actor, ClientId},
        db::answer::AnswerCore,
        mongodb::Id,
    };

    async fn create_survey_for_spec(client: &Client, spec: &SurveySpec) -> SurveyDescription {
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str(&raw_response).unwrap()
    }

    async fn create_question_for_spec(
        client: &Client,
        survey_id: SurveyId,
        spec: &QuestionSpec,
    ) -> QuestionDescription {
        let response = client
            .post(uri!(create_question(survey_id)))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str(&raw_response).unwrap()
    }

    async fn record_answers(client: &Client, answers: &Coll<Answer>, question: &Question) {
        let db_client = client.rocket().state::<mongodb::Client>().unwrap();
        for _ in 0..2 {
            let actor = Actor::Anonymous(ClientId::generate());
            let submission = match question.choices.first() {
                Some(choice) => AnswerSubmission::choices(question.id, &[choice.id]),
                None => AnswerSubmission::text(question.id, "answer"),
            };
            let answer = AnswerCore::verify(actor, question, submission).unwrap();
            Answer::record(answers, db_client, answer).await.unwrap();
        }
    }

    #[backend_test(admin)]
    async fn create_and_modify_survey(client: Client, surveys: Coll<Survey>) {
        let spec = SurveySpec::from(SurveyCore::example());
        let created = create_survey_for_spec(&client, &spec).await;
        assert_eq!(created.name, spec.name);
        assert_eq!(created.date_start, spec.date_start);

        let stored = surveys
            .find_one(u32_id_filter(created.id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.survey, SurveyCore::example());

        // IDs count up.
        let second = create_survey_for_spec(&client, &SurveySpec::from(SurveyCore::long_example())).await;
        assert_eq!(second.id, created.id + 1);

        let modified_spec = SurveySpec::from(SurveyCore::past_example());
        let response = client
            .put(uri!(modify_survey(created.id)))
            .header(ContentType::JSON)
            .body(json!(modified_spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let stored = surveys
            .find_one(u32_id_filter(created.id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.survey, SurveyCore::past_example());

        let response = client
            .put(uri!(modify_survey(999)))
            .header(ContentType::JSON)
            .body(json!(modified_spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn bad_survey_specs(client: Client, surveys: Coll<Survey>) {
        let mut backwards = SurveySpec::from(SurveyCore::long_example());
        std::mem::swap(&mut backwards.date_start, &mut backwards.date_end);
        let mut nameless = SurveySpec::from(SurveyCore::example());
        nameless.name = String::new();

        for spec in [backwards, nameless] {
            let response = client
                .post(uri!(create_survey))
                .header(ContentType::JSON)
                .body(json!(spec).to_string())
                .dispatch()
                .await;
            assert_eq!(Status::BadRequest, response.status());
        }
        assert_eq!(surveys.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(admin)]
    async fn list_surveys(client: Client) {
        for survey in [
            SurveyCore::example(),
            SurveyCore::past_example(),
            SurveyCore::undated_example(),
        ] {
            create_survey_for_spec(&client, &survey.into()).await;
        }

        let response = client
            .get(uri!(get_surveys(PaginationRequest {
                page: 1,
                page_size: 2
            })))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let page: Paginated<SurveyDescription> = serde_json::from_str(&raw_response).unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next.as_deref(), Some("/admin/surveys?page=2&page_size=2"));
        assert_eq!(page.results[1].date_start, SurveyCore::past_example().date_start);
    }

    #[backend_test]
    async fn requires_admin(client: Client) {
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!(SurveySpec::from(SurveyCore::example())).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .get(uri!(get_surveys(PaginationRequest::default())))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(user)]
    async fn users_are_not_admins(client: Client) {
        let response = client.delete(uri!(delete_survey(1))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn questions_and_choices(client: Client, questions: Coll<Question>) {
        let survey = create_survey_for_spec(&client, &SurveyCore::example().into()).await;

        let one = create_question_for_spec(&client, survey.id, &QuestionSpec::one_example()).await;
        let many = create_question_for_spec(&client, survey.id, &QuestionSpec::many_example()).await;
        let text = create_question_for_spec(&client, survey.id, &QuestionSpec::text_example()).await;

        // Choice IDs are unique across questions.
        let one_ids = one.choices.iter().map(|c| c.id).collect::<Vec<_>>();
        let many_ids = many.choices.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(one_ids, vec![1, 2]);
        assert_eq!(many_ids, vec![3, 4, 5]);
        assert!(text.choices.is_empty());

        let response = client
            .get(uri!(get_questions(survey.id)))
            .dispatch()
            .await;
        let raw_response = response.into_string().await.unwrap();
        let listed: Vec<QuestionDescription> = serde_json::from_str(&raw_response).unwrap();
        assert_eq!(listed, vec![one.clone(), many, text.clone()]);

        // Add a choice.
        let response = client
            .post(uri!(add_choice(one.id)))
            .header(ContentType::JSON)
            .body(json!({"title": "Hot chocolate"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let choice: ChoiceView = serde_json::from_str(&raw_response).unwrap();
        assert_eq!(choice.id, 6);
        let stored = questions
            .find_one(u32_id_filter(one.id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.choice(6).unwrap().title, "Hot chocolate");

        // Text questions take no choices.
        let response = client
            .post(uri!(add_choice(text.id)))
            .header(ContentType::JSON)
            .body(json!({"title": "Nope"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let mut text_with_choices = QuestionSpec::text_example();
        text_with_choices.choices.push("Nope".to_string());
        let response = client
            .post(uri!(create_question(survey.id)))
            .header(ContentType::JSON)
            .body(json!(text_with_choices).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Unknown survey.
        let response = client
            .post(uri!(create_question(999)))
            .header(ContentType::JSON)
            .body(json!(QuestionSpec::one_example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn delete_survey_cascades(
        client: Client,
        surveys: Coll<Survey>,
        questions: Coll<Question>,
        answers: Coll<Answer>,
    ) {
        let doomed = create_survey_for_spec(&client, &SurveyCore::example().into()).await;
        let kept = create_survey_for_spec(&client, &SurveyCore::long_example().into()).await;
        for (survey_id, spec) in [
            (doomed.id, QuestionSpec::one_example()),
            (doomed.id, QuestionSpec::text_example()),
            (kept.id, QuestionSpec::many_example()),
        ] {
            let created = create_question_for_spec(&client, survey_id, &spec).await;
            let question = questions
                .find_one(u32_id_filter(created.id), None)
                .await
                .unwrap()
                .unwrap();
            record_answers(&client, &answers, &question).await;
        }
        assert_eq!(answers.count_documents(None, None).await.unwrap(), 6);

        let response = client.delete(uri!(delete_survey(doomed.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        assert_eq!(surveys.count_documents(None, None).await.unwrap(), 1);
        assert_eq!(questions.count_documents(None, None).await.unwrap(), 1);
        assert_eq!(answers.count_documents(None, None).await.unwrap(), 2);
        assert_eq!(
            questions
                .count_documents(doc! { "survey_id": kept.id }, None)
                .await
                .unwrap(),
            1
        );

        let response = client.delete(uri!(delete_survey(doomed.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn delete_question_cascades(
        client: Client,
        questions: Coll<Question>,
        answers: Coll<Answer>,
    ) {
        let survey = create_survey_for_spec(&client, &SurveyCore::example().into()).await;
        let mut ids = Vec::new();
        for spec in [QuestionSpec::one_example(), QuestionSpec::text_example()] {
            let created = create_question_for_spec(&client, survey.id, &spec).await;
            let question = questions
                .find_one(u32_id_filter(created.id), None)
                .await
                .unwrap()
                .unwrap();
            record_answers(&client, &answers, &question).await;
            ids.push(created.id);
        }

        let response = client.delete(uri!(delete_question(ids[0]))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(questions.count_documents(None, None).await.unwrap(), 1);
        let remaining: Vec<Id> = answers
            .find(None, None)
            .await
            .unwrap()
            .map(|answer| answer.unwrap().id)
            .collect()
            .await;
        assert_eq!(remaining.len(), 2);
        assert_eq!(
            answers
                .count_documents(doc! { "question_id": ids[1] }, None)
                .await
                .unwrap(),
            2
        );

        let response = client.delete(uri!(delete_question(ids[0]))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
