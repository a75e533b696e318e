use serde::{Deserialize, Serialize};

use crate::model::common::{AnswerType, ChoiceId, QuestionId, SurveyId};

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub title: String,
}

/// A single question, with its choices embedded.
///
/// A question's position in its survey is its rank by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    pub survey_id: SurveyId,
    pub answer_type: AnswerType,
    pub text: String,
    /// Always empty for text questions.
    pub choices: Vec<Choice>,
}

impl Question {
    /// Find one of this question's own choices.
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}
