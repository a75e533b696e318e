use std::fmt::{Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Our survey IDs are integers.
pub type SurveyId = u32;
/// Our question IDs are integers, assigned in creation order.
pub type QuestionId = u32;
/// Our choice IDs are integers, unique across all questions.
pub type ChoiceId = u32;

/// How a question is answered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    /// Exactly one of the question's choices.
    One,
    /// One or more of the question's choices.
    Many,
    /// Free text; the question has no choices.
    Text,
}

impl AnswerType {
    /// Is this question answered by picking choices?
    pub fn has_choices(self) -> bool {
        !matches!(self, Self::Text)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Many => "many",
            Self::Text => "text",
        }
    }
}

impl Display for AnswerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<AnswerType> for Bson {
    fn from(answer_type: AnswerType) -> Self {
        to_bson(&answer_type).expect("Serialisation is infallible")
    }
}
