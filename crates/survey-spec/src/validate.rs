use std::collections::BTreeSet;

use crate::answers::{AnswerSet, AnswerValue, ValidationError, ValidationResult};
use crate::spec::form::SurveySpec;
use crate::spec::question::{QuestionKind, QuestionSpec};

/// Checks that every answer belongs to a known question and has the shape
/// its question kind calls for. Unanswered questions are never reported.
pub fn validate_answers(spec: &SurveySpec, answers: &AnswerSet) -> ValidationResult {
    let mut errors = Vec::new();
    let mut unknown_fields = Vec::new();

    for (id, value) in answers.iter() {
        match spec.question(id) {
            None => unknown_fields.push(id),
            Some(question) => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
        }
    }

    ValidationResult {
        valid: errors.is_empty() && unknown_fields.is_empty(),
        errors,
        unknown_fields,
    }
}

fn validate_value(question: &QuestionSpec, value: &AnswerValue) -> Option<ValidationError> {
    match (&question.kind, value) {
        (QuestionKind::Text { .. }, AnswerValue::One(_)) => None,
        (QuestionKind::Single { .. }, AnswerValue::One(option)) => {
            unknown_option(question, option)
        }
        (QuestionKind::Multi { .. } | QuestionKind::MultiLimited { .. }, AnswerValue::Many(selected)) => {
            validate_selection(question, selected)
        }
        _ => Some(base_error(question, "type mismatch", "type_mismatch")),
    }
}

fn validate_selection(question: &QuestionSpec, selected: &[String]) -> Option<ValidationError> {
    let mut seen = BTreeSet::new();
    for option in selected {
        if let Some(error) = unknown_option(question, option) {
            return Some(error);
        }
        if !seen.insert(option.as_str()) {
            return Some(base_error(
                question,
                &format!("option `{option}` selected twice"),
                "duplicate_option",
            ));
        }
    }

    if let Some(limit) = question.kind.limit()
        && selected.len() > limit
    {
        return Some(base_error(
            question,
            &format!("at most {limit} options may be selected, got {}", selected.len()),
            "limit_exceeded",
        ));
    }
    None
}

fn unknown_option(question: &QuestionSpec, option: &str) -> Option<ValidationError> {
    (!question.offers(option)).then(|| {
        base_error(
            question,
            &format!("`{option}` is not an option"),
            "unknown_option",
        )
    })
}

fn base_error(question: &QuestionSpec, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: question.id,
        message: message.to_string(),
        code: code.to_string(),
    }
}
