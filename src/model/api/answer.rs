use serde::{Deserialize, Serialize};

use crate::model::common::{ChoiceId, QuestionId};

/// A reference to a chosen option. The title is accepted for client convenience but ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRef {
    pub id: ChoiceId,
    #[serde(default)]
    pub title: Option<String>,
}

/// An answer as submitted by a respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<ChoiceRef>>,
}
