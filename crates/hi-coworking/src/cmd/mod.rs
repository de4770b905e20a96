pub mod i18n;
pub mod lead;
pub mod prompt;
pub mod questions;
pub mod survey;
