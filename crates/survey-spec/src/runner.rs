use tracing::debug;

use crate::answers::{AnswerSet, AnswerValue};
use crate::gateway::SubmissionOutcome;
use crate::spec::question::QuestionKind;
use crate::wizard::{Advance, Wizard, WizardError};

/// Drives `wizard` from its current step to submission, feeding each step
/// the matching entry of `answers` through the regular input handlers.
///
/// Steps without an entry are skipped over unanswered. `answers` should have
/// passed `validate_answers` first; a value the current question rejects
/// aborts the run with the wizard still editing.
pub async fn run_to_completion(
    wizard: &mut Wizard,
    answers: &AnswerSet,
) -> Result<SubmissionOutcome, WizardError> {
    loop {
        let question = wizard.current_question().clone();
        let step = match answers.get(question.id) {
            Some(AnswerValue::One(text)) if matches!(question.kind, QuestionKind::Text { .. }) => {
                wizard.set_text(text.clone())?;
                wizard.advance().await?
            }
            Some(AnswerValue::One(option)) => wizard.select_option(option).await?,
            Some(AnswerValue::Many(selected)) if selected.is_empty() => {
                wizard.record_empty_selection()?;
                wizard.advance().await?
            }
            Some(AnswerValue::Many(selected)) => {
                for option in selected {
                    if !wizard.is_selected(option) {
                        wizard.toggle_option(option)?;
                    }
                }
                wizard.advance().await?
            }
            None => wizard.advance().await?,
        };

        match step {
            Advance::Moved { cursor } => debug!(cursor, "replayed step"),
            Advance::Submitted(outcome) => return Ok(outcome),
        }
    }
}
