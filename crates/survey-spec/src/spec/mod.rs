pub mod form;
pub mod question;

pub use form::{SpecError, SurveySpec, spec_schema};
pub use question::{QuestionId, QuestionKind, QuestionSpec};
