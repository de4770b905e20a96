use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::question::{QuestionId, QuestionKind, QuestionSpec};

/// Top-level survey definition: an ordered, fixed list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionSpec>,
}

/// Structural problems found while loading a survey definition.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("survey definition is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("survey `{0}` has no questions")]
    Empty(String),
    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
    #[error("question id {id} follows {previous}; ids must ascend")]
    OutOfOrder {
        id: QuestionId,
        previous: QuestionId,
    },
    #[error("question {0} offers no options")]
    NoOptions(QuestionId),
    #[error("question {id} lists option `{option}` more than once")]
    DuplicateOption { id: QuestionId, option: String },
    #[error("question {id} has limit {limit}; it must be between 1 and {options}")]
    InvalidLimit {
        id: QuestionId,
        limit: usize,
        options: usize,
    },
}

impl SurveySpec {
    /// Parses and checks a JSON survey definition.
    pub fn from_json(raw: &str) -> Result<Self, SpecError> {
        let spec: SurveySpec = serde_json::from_str(raw)?;
        spec.check()?;
        Ok(spec)
    }

    /// Verifies the structural invariants the wizard relies on.
    pub fn check(&self) -> Result<(), SpecError> {
        if self.questions.is_empty() {
            return Err(SpecError::Empty(self.id.clone()));
        }

        let mut seen = BTreeSet::new();
        let mut previous: Option<QuestionId> = None;
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(SpecError::DuplicateId(question.id));
            }
            if let Some(previous) = previous
                && question.id < previous
            {
                return Err(SpecError::OutOfOrder {
                    id: question.id,
                    previous,
                });
            }
            previous = Some(question.id);
            check_options(question)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: QuestionId) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }
}

fn check_options(question: &QuestionSpec) -> Result<(), SpecError> {
    let options = question.kind.options();
    if !matches!(question.kind, QuestionKind::Text { .. }) && options.is_empty() {
        return Err(SpecError::NoOptions(question.id));
    }

    let mut unique = BTreeSet::new();
    for option in options {
        if !unique.insert(option.as_str()) {
            return Err(SpecError::DuplicateOption {
                id: question.id,
                option: option.clone(),
            });
        }
    }

    if let Some(limit) = question.kind.limit()
        && (limit == 0 || limit > options.len())
    {
        return Err(SpecError::InvalidLimit {
            id: question.id,
            limit,
            options: options.len(),
        });
    }
    Ok(())
}

/// JSON Schema describing the survey definition format.
pub fn spec_schema() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schemars::schema_for!(SurveySpec))
}
