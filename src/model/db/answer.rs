use std::collections::HashSet;
use std::ops::Deref;

use log::debug;
use mongodb::{bson::doc, error::Error as DbError, Client};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::answer::AnswerSubmission,
    common::{Actor, AnswerType, ChoiceId, QuestionId},
    mongodb::{is_conflict, Coll, Id},
};

use super::question::Question;

/// Core answer data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCore {
    pub actor: Actor,
    pub question_id: QuestionId,
    /// Present iff the question is a text question.
    pub text_answer: Option<String>,
    /// Non-empty iff the question is a choice question.
    pub choices: Vec<ChoiceId>,
}

impl AnswerCore {
    /// Check a submission against the question it answers, producing an answer that is safe
    /// to store.
    ///
    /// Exactly one of the three answer shapes applies, chosen by the question's type.
    pub fn verify(actor: Actor, question: &Question, submission: AnswerSubmission) -> Result<Self> {
        if submission.question_id != question.id {
            return Err(Error::not_acceptable(format!(
                "Submission for question {} checked against question {}",
                submission.question_id, question.id
            )));
        }

        let choice_ids = submission
            .choices
            .unwrap_or_default()
            .into_iter()
            .map(|choice| choice.id)
            .collect::<Vec<_>>();

        let (text_answer, choices) = match question.answer_type {
            AnswerType::One | AnswerType::Many => {
                if submission.answer_text.is_some() {
                    return Err(Error::not_acceptable(format!(
                        "Question {} takes choices, not text",
                        question.id
                    )));
                }
                let expected_one = question.answer_type == AnswerType::One;
                if choice_ids.is_empty() || (expected_one && choice_ids.len() != 1) {
                    return Err(Error::not_acceptable(format!(
                        "Question {} takes {} choice(s), got {}",
                        question.id,
                        if expected_one { "exactly one" } else { "one or more" },
                        choice_ids.len()
                    )));
                }
                let distinct = choice_ids.iter().collect::<HashSet<_>>();
                if distinct.len() != choice_ids.len() {
                    return Err(Error::not_acceptable(format!(
                        "Duplicate choices submitted for question {}",
                        question.id
                    )));
                }
                if let Some(foreign) = choice_ids.iter().find(|id| question.choice(**id).is_none())
                {
                    return Err(Error::not_acceptable(format!(
                        "Choice {foreign} does not belong to question {}",
                        question.id
                    )));
                }
                (None, choice_ids)
            }
            AnswerType::Text => {
                if !choice_ids.is_empty() {
                    return Err(Error::not_acceptable(format!(
                        "Question {} takes text, not choices",
                        question.id
                    )));
                }
                let text = submission.answer_text.ok_or_else(|| {
                    Error::not_acceptable(format!("Question {} requires answer text", question.id))
                })?;
                (Some(text), Vec::new())
            }
        };

        Ok(Self {
            actor,
            question_id: question.id,
            text_answer,
            choices,
        })
    }
}

/// A stored answer, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub answer: AnswerCore,
}

impl Deref for Answer {
    type Target = AnswerCore;

    fn deref(&self) -> &Self::Target {
        &self.answer
    }
}

impl Answer {
    /// Store a verified answer, replacing any previous answer by the same actor to the same
    /// question.
    ///
    /// The delete and insert happen in one transaction. If a concurrent submission by the same
    /// actor wins the race, this one is rejected and nothing is written.
    pub async fn record(
        answers: &Coll<Answer>,
        db_client: &Client,
        answer: AnswerCore,
    ) -> Result<Answer> {
        let answer = Answer {
            id: Id::new(),
            answer,
        };

        let outcome = async {
            let mut session = db_client.start_session(None).await?;
            session.start_transaction(None).await?;

            let previous = doc! {
                "question_id": answer.question_id,
                "actor": answer.actor.clone(),
            };
            let deleted = answers
                .delete_many_with_session(previous, None, &mut session)
                .await?
                .deleted_count;
            answers
                .insert_one_with_session(&answer, None, &mut session)
                .await?;

            session.commit_transaction().await?;
            Ok::<_, DbError>(deleted)
        }
        .await;

        match outcome {
            Ok(deleted) => {
                debug!(
                    "Recorded answer {} by {} to question {} (replaced {deleted})",
                    answer.id, answer.actor, answer.question_id
                );
                Ok(answer)
            }
            Err(e) if is_conflict(&e) => Err(Error::not_acceptable(format!(
                "Concurrent answer by {} to question {}: {e}",
                answer.actor, answer.question_id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
