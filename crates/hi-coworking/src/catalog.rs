use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use survey_spec::SurveySpec;

const COWORKING_SURVEY: &str = include_str!("../assets/survey.json");

/// The ten-question Hi Coworking survey shipped with the binary.
pub fn coworking_survey() -> Result<SurveySpec> {
    SurveySpec::from_json(COWORKING_SURVEY).context("embedded survey catalog is invalid")
}

/// Loads `path` when given, otherwise the embedded catalog.
pub fn load_survey(path: Option<&Path>) -> Result<SurveySpec> {
    let Some(path) = path else {
        return coworking_survey();
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read survey definition {}", path.display()))?;
    SurveySpec::from_json(&raw)
        .with_context(|| format!("invalid survey definition {}", path.display()))
}
