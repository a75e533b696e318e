mod actor;
mod client_id;
pub mod navigation;
mod survey;

pub use actor::Actor;
pub use client_id::{ClientId, CLIENT_ID_COOKIE};
pub use survey::{AnswerType, ChoiceId, QuestionId, SurveyId};
