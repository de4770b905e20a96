//! Step-by-step survey state machine.
//!
//! A [`Wizard`] walks a fixed question list one step at a time. Answers
//! accumulate as the respondent goes; stepping past the last question submits
//! them once through the injected [`SubmissionGateway`]. Submission only moves
//! forward (`editing -> submitting -> submitted`) and ends in `submitted`
//! whatever the gateway reports.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::answers::{AnswerSet, AnswerValue};
use crate::gateway::{SubmissionGateway, SubmissionOutcome, deliver};
use crate::payload::{Submission, SurveyPayload, format_timestamp};
use crate::spec::form::{SpecError, SurveySpec};
use crate::spec::question::{QuestionId, QuestionKind, QuestionSpec};

/// Pause between picking a single-choice option and moving on.
pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Submitted,
}

/// Label of the forward button for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Finish,
    Sending,
}

impl PrimaryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryAction::Next => "next",
            PrimaryAction::Finish => "finish",
            PrimaryAction::Sending => "sending",
        }
    }
}

/// Result of a forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { cursor: usize },
    Submitted(SubmissionOutcome),
}

/// Result of toggling a multi-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The question's selection limit is already reached.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("the survey is {0:?}; only an editing survey accepts input")]
    NotEditing(SubmissionState),
    #[error("question {id} is a `{kind}` question and does not support {operation}")]
    KindMismatch {
        id: QuestionId,
        kind: &'static str,
        operation: &'static str,
    },
    #[error("question {id} does not offer `{option}`")]
    UnknownOption { id: QuestionId, option: String },
    #[error("the survey can only be submitted from the last question (at {position} of {total})")]
    NotOnLastStep { position: usize, total: usize },
}

/// Tunables for a wizard session.
#[derive(Debug, Clone, Copy)]
pub struct WizardOptions {
    pub auto_advance: Duration,
    pub clock: fn() -> OffsetDateTime,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            auto_advance: DEFAULT_AUTO_ADVANCE,
            clock: OffsetDateTime::now_utc,
        }
    }
}

/// One survey session. Dropping it discards every in-progress answer.
pub struct Wizard {
    spec: Arc<SurveySpec>,
    gateway: Arc<dyn SubmissionGateway>,
    options: WizardOptions,
    cursor: usize,
    answers: AnswerSet,
    state: SubmissionState,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("survey", &self.spec.id)
            .field("cursor", &self.cursor)
            .field("answers", &self.answers)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new(
        spec: Arc<SurveySpec>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Result<Self, SpecError> {
        Self::with_options(spec, gateway, WizardOptions::default())
    }

    pub fn with_options(
        spec: Arc<SurveySpec>,
        gateway: Arc<dyn SubmissionGateway>,
        options: WizardOptions,
    ) -> Result<Self, SpecError> {
        spec.check()?;
        debug!(survey = %spec.id, questions = spec.len(), "survey opened");
        Ok(Self {
            spec,
            gateway,
            options,
            cursor: 0,
            answers: AnswerSet::new(),
            state: SubmissionState::Editing,
        })
    }

    pub fn spec(&self) -> &SurveySpec {
        &self.spec
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_question(&self) -> &QuestionSpec {
        &self.spec.questions[self.cursor]
    }

    pub fn is_last_step(&self) -> bool {
        self.cursor + 1 == self.spec.len()
    }

    pub fn can_retreat(&self) -> bool {
        self.state == SubmissionState::Editing && self.cursor > 0
    }

    /// Share of the survey reached, counting the current step.
    pub fn progress_percent(&self) -> u8 {
        ((self.cursor + 1) * 100 / self.spec.len()) as u8
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.state {
            SubmissionState::Editing if self.is_last_step() => PrimaryAction::Finish,
            SubmissionState::Editing => PrimaryAction::Next,
            SubmissionState::Submitting | SubmissionState::Submitted => PrimaryAction::Sending,
        }
    }

    /// Whether `option` is part of the current question's answer.
    pub fn is_selected(&self, option: &str) -> bool {
        let question = self.current_question();
        match self.answers.get(question.id) {
            Some(AnswerValue::One(value)) => {
                matches!(question.kind, QuestionKind::Single { .. }) && value == option
            }
            Some(AnswerValue::Many(values)) => values.iter().any(|value| value == option),
            None => false,
        }
    }

    /// Records a single-choice answer, then moves forward after the
    /// configured delay.
    pub async fn select_option(&mut self, option: &str) -> Result<Advance, WizardError> {
        self.ensure_editing()?;
        let spec = Arc::clone(&self.spec);
        let question = &spec.questions[self.cursor];
        if !matches!(question.kind, QuestionKind::Single { .. }) {
            return Err(kind_mismatch(question, "select_option"));
        }
        ensure_offered(question, option)?;

        self.answers
            .insert(question.id, AnswerValue::One(option.to_string()));
        debug!(question = question.id, option, "single choice recorded");

        if !self.options.auto_advance.is_zero() {
            tokio::time::sleep(self.options.auto_advance).await;
        }
        self.advance().await
    }

    /// Adds or removes `option` on a multi-choice question. Additions past
    /// the question's limit are ignored.
    pub fn toggle_option(&mut self, option: &str) -> Result<Toggle, WizardError> {
        self.ensure_editing()?;
        let spec = Arc::clone(&self.spec);
        let question = &spec.questions[self.cursor];
        if !question.kind.is_multi() {
            return Err(kind_mismatch(question, "toggle_option"));
        }
        ensure_offered(question, option)?;

        let mut selected = self.answers.take_selection(question.id);
        let toggle = if let Some(position) = selected.iter().position(|value| value == option) {
            selected.remove(position);
            Toggle::Removed
        } else if question
            .kind
            .limit()
            .is_some_and(|limit| selected.len() >= limit)
        {
            warn!(
                question = question.id,
                option, "selection limit reached; option ignored"
            );
            Toggle::Ignored
        } else {
            selected.push(option.to_string());
            Toggle::Added
        };
        self.answers.insert(question.id, AnswerValue::Many(selected));
        debug!(question = question.id, option, ?toggle, "multi choice toggled");
        Ok(toggle)
    }

    /// Records an explicit empty selection on the current multi-choice
    /// question unless it already has one.
    pub(crate) fn record_empty_selection(&mut self) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let question = self.current_question();
        if !question.kind.is_multi() {
            return Err(kind_mismatch(question, "record_empty_selection"));
        }
        let id = question.id;
        if self.answers.get(id).is_none() {
            self.answers.insert(id, AnswerValue::Many(Vec::new()));
        }
        Ok(())
    }

    /// Overwrites the free-text answer of the current question.
    pub fn set_text(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let question = self.current_question();
        if !matches!(question.kind, QuestionKind::Text { .. }) {
            return Err(kind_mismatch(question, "set_text"));
        }
        let id = question.id;
        self.answers.insert(id, AnswerValue::One(value.into()));
        Ok(())
    }

    /// Moves to the next question, or submits from the last one.
    /// Unanswered questions do not block.
    pub async fn advance(&mut self) -> Result<Advance, WizardError> {
        self.ensure_editing()?;
        if !self.is_last_step() {
            self.cursor += 1;
            debug!(cursor = self.cursor, "advanced");
            return Ok(Advance::Moved {
                cursor: self.cursor,
            });
        }
        self.submit().await.map(Advance::Submitted)
    }

    /// Moves back one question. Returns `false` on the first question.
    pub fn retreat(&mut self) -> Result<bool, WizardError> {
        self.ensure_editing()?;
        if self.cursor == 0 {
            return Ok(false);
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "retreated");
        Ok(true)
    }

    /// Sends the answers once. The session ends in `submitted` even when the
    /// gateway fails; the outcome is returned for logging only.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, WizardError> {
        let payload = self.begin_submission()?;
        let outcome = deliver(self.gateway.as_ref(), &payload).await;
        self.state = SubmissionState::Submitted;
        info!(survey = %self.spec.id, answered = self.answers.len(), ?outcome, "survey submitted");
        Ok(outcome)
    }

    fn begin_submission(&mut self) -> Result<Submission, WizardError> {
        self.ensure_editing()?;
        if !self.is_last_step() {
            return Err(WizardError::NotOnLastStep {
                position: self.cursor + 1,
                total: self.spec.len(),
            });
        }
        self.state = SubmissionState::Submitting;
        Ok(Submission::Survey(SurveyPayload {
            answers: self.answers.clone(),
            timestamp: format_timestamp((self.options.clock)()),
        }))
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.state {
            SubmissionState::Editing => Ok(()),
            state => Err(WizardError::NotEditing(state)),
        }
    }
}

fn kind_mismatch(question: &QuestionSpec, operation: &'static str) -> WizardError {
    WizardError::KindMismatch {
        id: question.id,
        kind: question.kind.as_str(),
        operation,
    }
}

fn ensure_offered(question: &QuestionSpec, option: &str) -> Result<(), WizardError> {
    if question.offers(option) {
        return Ok(());
    }
    Err(WizardError::UnknownOption {
        id: question.id,
        option: option.to_string(),
    })
}
