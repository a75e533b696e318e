use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{navigation::Position, AnswerType, ChoiceId, QuestionId, SurveyId},
    db::question::{Choice, Question},
};

/// A choice as shown to respondents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    pub id: ChoiceId,
    pub title: String,
}

impl From<Choice> for ChoiceView {
    fn from(choice: Choice) -> Self {
        Self {
            id: choice.id,
            title: choice.title,
        }
    }
}

/// A single question as shown to respondents, with links to its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    /// Total number of questions in the survey.
    pub questions_num: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub text: String,
    pub question_type: AnswerType,
    pub choices: Vec<ChoiceView>,
}

impl QuestionView {
    pub fn new(question: Question, position: Position) -> Self {
        Self {
            id: question.id,
            questions_num: position.count(),
            next: position.next_href(question.survey_id),
            previous: position.previous_href(question.survey_id),
            text: question.text,
            question_type: question.answer_type,
            choices: question.choices.into_iter().map(Into::into).collect(),
        }
    }
}

/// The result of looking up a question: either the question, or an empty object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionLookup {
    Found(QuestionView),
    Missing {},
}

/// A question as created by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    pub question_type: AnswerType,
    /// Choice titles; must be empty for text questions.
    #[serde(default)]
    pub choices: Vec<String>,
}

impl QuestionSpec {
    /// Build the stored question, giving its choices consecutive IDs from `first_choice`.
    pub fn into_question(
        self,
        id: QuestionId,
        survey_id: SurveyId,
        first_choice: ChoiceId,
    ) -> Question {
        Question {
            id,
            survey_id,
            answer_type: self.question_type,
            text: self.text,
            choices: self
                .choices
                .into_iter()
                .zip(first_choice..)
                .map(|(title, id)| Choice { id, title })
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::bad_request("Question text must not be empty".to_string()));
        }
        if !self.question_type.has_choices() && !self.choices.is_empty() {
            return Err(Error::bad_request(
                "Text questions cannot have choices".to_string(),
            ));
        }
        Ok(())
    }
}

/// A new choice, as added by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSpec {
    pub title: String,
}

/// Full question details, as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDescription {
    pub id: QuestionId,
    pub survey_id: SurveyId,
    pub text: String,
    pub question_type: AnswerType,
    pub choices: Vec<ChoiceView>,
}

impl From<Question> for QuestionDescription {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            survey_id: question.survey_id,
            text: question.text,
            question_type: question.answer_type,
            choices: question.choices.into_iter().map(Into::into).collect(),
        }
    }
}
