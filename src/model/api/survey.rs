use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{navigation::survey_href, SurveyId},
    db::survey::{Survey, SurveyCore},
};

/// A survey as listed in the public catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub survey_id: SurveyId,
    pub survey_name: String,
    pub survey_description: String,
    /// Link to the survey's first question.
    pub survey_href: String,
}

impl From<Survey> for SurveySummary {
    fn from(survey: Survey) -> Self {
        Self {
            survey_id: survey.id,
            survey_href: survey_href(survey.id),
            survey_name: survey.survey.name,
            survey_description: survey.survey.description,
        }
    }
}

/// A survey as created or modified by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub date_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_end: Option<NaiveDate>,
}

impl TryFrom<SurveySpec> for SurveyCore {
    type Error = Error;

    fn try_from(spec: SurveySpec) -> Result<Self> {
        if spec.name.trim().is_empty() {
            return Err(Error::bad_request("Survey name must not be empty".to_string()));
        }
        if let (Some(start), Some(end)) = (spec.date_start, spec.date_end) {
            if end < start {
                return Err(Error::bad_request(format!(
                    "Survey ends ({end}) before it starts ({start})"
                )));
            }
        }
        Ok(Self {
            name: spec.name,
            description: spec.description,
            date_start: spec.date_start,
            date_end: spec.date_end,
        })
    }
}

/// Full survey details, as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDescription {
    pub id: SurveyId,
    pub name: String,
    pub description: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id,
            name: survey.survey.name,
            description: survey.survey.description,
            date_start: survey.survey.date_start,
            date_end: survey.survey.date_end,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl From<SurveyCore> for SurveySpec {
        fn from(survey: SurveyCore) -> Self {
            Self {
                name: survey.name,
                description: survey.description,
                date_start: survey.date_start,
                date_end: survey.date_end,
            }
        }
    }
}
