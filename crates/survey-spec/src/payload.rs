use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::answers::AnswerSet;

/// UTC with millisecond precision, e.g. `2025-01-02T03:04:05.678Z`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Everything the submission endpoint accepts, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Submission {
    Survey(SurveyPayload),
    EarlyAccess(LeadPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyPayload {
    pub answers: AnswerSet,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    pub interests: Vec<String>,
    pub timestamp: String,
}

impl Submission {
    /// The discriminator value written to the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Submission::Survey(_) => "survey",
            Submission::EarlyAccess(_) => "early_access",
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Submission::Survey(payload) => &payload.timestamp,
            Submission::EarlyAccess(payload) => &payload.timestamp,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Formats a capture instant as an ISO-8601 UTC timestamp.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    // Numeric components only; they render for every representable date.
    at.to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .expect("format UTC timestamp")
}
