use crate::spec::question::{QuestionId, QuestionKind};
use crate::wizard::{PrimaryAction, SubmissionState, Wizard};

/// One option line as a front end would draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOption {
    /// 1-based position used for keyboard selection.
    pub position: usize,
    pub label: String,
    pub selected: bool,
}

/// Snapshot of everything needed to draw the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStep {
    pub question_id: QuestionId,
    pub prompt: String,
    pub kind: QuestionKind,
    /// 1-based step number.
    pub position: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub options: Vec<RenderOption>,
    pub text: Option<String>,
    pub placeholder: Option<String>,
    pub limit: Option<usize>,
    pub can_retreat: bool,
    pub primary_action: PrimaryAction,
    pub state: SubmissionState,
}

/// Builds the render snapshot for the wizard's current step.
pub fn build_render_step(wizard: &Wizard) -> RenderStep {
    let question = wizard.current_question();
    let options = question
        .kind
        .options()
        .iter()
        .enumerate()
        .map(|(index, label)| RenderOption {
            position: index + 1,
            label: label.clone(),
            selected: wizard.is_selected(label),
        })
        .collect();
    let text = match question.kind {
        QuestionKind::Text { .. } => wizard.answers().text(question.id).map(str::to_string),
        _ => None,
    };

    RenderStep {
        question_id: question.id,
        prompt: question.prompt.clone(),
        kind: question.kind.clone(),
        position: wizard.cursor() + 1,
        total: wizard.spec().len(),
        progress_percent: wizard.progress_percent(),
        options,
        text,
        placeholder: question.kind.placeholder().map(str::to_string),
        limit: question.kind.limit(),
        can_retreat: wizard.can_retreat(),
        primary_action: wizard.primary_action(),
        state: wizard.state(),
    }
}
