use anyhow::Result;
use clap::Args;
use survey_spec::{QuestionKind, SurveySpec, spec_schema};

use crate::catalog::load_survey;
use crate::cmd::i18n::{tr, trf};
use crate::config::Settings;

#[derive(Args, Debug, Clone)]
pub struct QuestionsArgs {
    /// Print the survey definition as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &QuestionsArgs, settings: &Settings) -> Result<()> {
    let spec = load_survey(settings.survey_spec.as_deref())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&spec)?);
    } else {
        print!("{}", render_listing(&spec));
    }
    Ok(())
}

pub fn schema() -> Result<()> {
    let schema = spec_schema()?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn render_listing(spec: &SurveySpec) -> String {
    let mut out = trf(
        "cli.questions.header",
        &[&spec.title, &spec.len().to_string()],
    );
    out.push('\n');
    for question in &spec.questions {
        out.push_str(&format!(
            "{:>3}. {} [{}]\n",
            question.id,
            question.prompt,
            kind_label(&question.kind)
        ));
        for (index, option) in question.kind.options().iter().enumerate() {
            out.push_str(&format!("       {}. {option}\n", index + 1));
        }
    }
    out
}

fn kind_label(kind: &QuestionKind) -> String {
    match kind {
        QuestionKind::MultiLimited { limit, .. } => {
            trf("cli.questions.kind.multi_limited", &[&limit.to_string()])
        }
        other => tr(&format!("cli.questions.kind.{}", other.as_str())),
    }
}
