//! Walking a survey's questions by 1-based position.

use super::SurveyId;

/// Path of the single-question endpoint.
pub const SURVEY_PATH: &str = "/survey/";

/// Link to the survey's first question.
pub fn survey_href(survey_id: SurveyId) -> String {
    format!("{SURVEY_PATH}?survey_id={survey_id}")
}

/// Link to the question at the given position of the survey.
pub fn question_href(survey_id: SurveyId, ordinal: u64) -> String {
    format!("{SURVEY_PATH}?survey_id={survey_id}&question={ordinal}")
}

/// Parse a requested question position. Integers beyond the range of `i64` saturate, so
/// they still clamp to the nearest end of the survey; anything else is no request at all.
pub fn parse_requested(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(requested) = raw.parse::<i64>() {
        return Some(requested);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// A valid position within a survey with at least one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    ordinal: u64,
    count: u64,
}

impl Position {
    /// Resolve a requested position against the number of questions, clamping it into
    /// `1..=count`. A missing request means the first question.
    ///
    /// Returns `None` iff the survey has no questions.
    pub fn clamped(requested: Option<i64>, count: u64) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let requested = requested.unwrap_or(1);
        let ordinal = if requested < 1 {
            1
        } else {
            (requested as u64).min(count)
        };
        Some(Self { ordinal, count })
    }

    /// Total number of questions in the survey.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// How many questions precede this one in ID order.
    pub fn skip(&self) -> u64 {
        self.ordinal - 1
    }

    pub fn next_href(&self, survey_id: SurveyId) -> Option<String> {
        (self.ordinal < self.count).then(|| question_href(survey_id, self.ordinal + 1))
    }

    pub fn previous_href(&self, survey_id: SurveyId) -> Option<String> {
        (self.ordinal > 1).then(|| question_href(survey_id, self.ordinal - 1))
    }
}
