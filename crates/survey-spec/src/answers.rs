use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionId;

/// A recorded response. Single-choice and free-text answers are plain
/// strings, multi-choice answers are lists of option labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::One(value) => Some(value),
            AnswerValue::Many(_) => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[String]> {
        match self {
            AnswerValue::One(_) => None,
            AnswerValue::Many(values) => Some(values),
        }
    }
}

/// Answers keyed by question id. A missing key means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    /// Text of a single-choice or free-text answer.
    pub fn text(&self, id: QuestionId) -> Option<&str> {
        self.get(id).and_then(AnswerValue::as_str)
    }

    /// Current selection of a multi-choice answer; empty when unanswered.
    pub fn selected(&self, id: QuestionId) -> &[String] {
        self.get(id).and_then(AnswerValue::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, id: QuestionId, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(id, value)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.answers.iter().map(|(id, value)| (*id, value))
    }

    /// Removes and returns the selection list for `id`; empty when absent.
    pub(crate) fn take_selection(&mut self, id: QuestionId) -> Vec<String> {
        match self.answers.remove(&id) {
            Some(AnswerValue::Many(values)) => values,
            _ => Vec::new(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<(QuestionId, AnswerValue)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerValue)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Validation error metadata reported by `validate_answers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub question_id: QuestionId,
    pub message: String,
    pub code: String,
}

/// Result returned from `validate_answers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<QuestionId>,
}

impl ValidationResult {
    /// One line per problem, suitable for terminal output.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| format!("question {}: {}", error.question_id, error.message))
            .chain(
                self.unknown_fields
                    .iter()
                    .map(|id| format!("unknown question id: {id}")),
            )
            .collect()
    }
}
