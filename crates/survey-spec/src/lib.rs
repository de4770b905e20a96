#![allow(missing_docs)]

pub mod answers;
pub mod gateway;
pub mod lead;
pub mod payload;
pub mod render;
pub mod runner;
pub mod spec;
pub mod validate;
pub mod wizard;

pub use answers::{AnswerSet, AnswerValue, ValidationError, ValidationResult};
pub use gateway::{
    GatewayError, LogGateway, MemoryGateway, SubmissionGateway, SubmissionOutcome, deliver,
};
pub use lead::{DEFAULT_INTERESTS, LeadForm, LeadFormError, LeadStatus, is_valid_email};
pub use payload::{LeadPayload, Submission, SurveyPayload, format_timestamp};
pub use render::{RenderOption, RenderStep, build_render_step};
pub use runner::run_to_completion;
pub use spec::{QuestionId, QuestionKind, QuestionSpec, SpecError, SurveySpec, spec_schema};
pub use validate::validate_answers;
pub use wizard::{
    Advance, DEFAULT_AUTO_ADVANCE, PrimaryAction, SubmissionState, Toggle, Wizard, WizardError,
    WizardOptions,
};
