use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use survey_spec::{
    Advance, AnswerSet, PrimaryAction, QuestionKind, RenderStep, SubmissionGateway, SurveySpec,
    Toggle, Wizard, WizardOptions, build_render_step, run_to_completion, validate_answers,
};
use tracing::info;

use crate::catalog::load_survey;
use crate::cmd::i18n::{tr, trf};
use crate::cmd::prompt::Prompter;
use crate::config::Settings;
use crate::gateway;

#[derive(Args, Debug, Clone)]
pub struct SurveyArgs {
    /// Replay answers from a JSON file instead of prompting
    #[arg(long, value_name = "answers.json")]
    pub answers: Option<PathBuf>,
    /// Print the payload instead of sending it
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
}

pub async fn run(args: SurveyArgs, settings: &Settings) -> Result<()> {
    let spec = Arc::new(load_survey(settings.survey_spec.as_deref())?);
    let gateway = gateway::build(settings, args.dry_run)?;

    if let Some(path) = &args.answers {
        replay(spec, gateway, path).await?;
    } else {
        if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
            bail!(tr("cli.survey.error.not_interactive"));
        }
        let options = WizardOptions {
            auto_advance: settings.auto_advance,
            ..WizardOptions::default()
        };
        let wizard = Wizard::with_options(spec, gateway, options)?;
        let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
        if !interact(wizard, &mut prompter).await? {
            return Ok(());
        }
    }

    if !args.dry_run {
        println!("{}", tr("cli.survey.result.thanks"));
    }
    Ok(())
}

/// Feeds a validated answers file through the wizard without pausing.
async fn replay(
    spec: Arc<SurveySpec>,
    gateway: Arc<dyn SubmissionGateway>,
    path: &Path,
) -> Result<()> {
    let answers = load_answers(path)?;
    let report = validate_answers(&spec, &answers);
    if !report.valid {
        for message in report.messages() {
            eprintln!("  {message}");
        }
        bail!(trf(
            "cli.survey.error.invalid_answers",
            &[&path.display().to_string()]
        ));
    }

    let options = WizardOptions {
        auto_advance: Duration::ZERO,
        ..WizardOptions::default()
    };
    let mut wizard = Wizard::with_options(spec, gateway, options)?;
    let outcome = run_to_completion(&mut wizard, &answers).await?;
    info!(path = %path.display(), ?outcome, "answers replayed");
    Ok(())
}

fn load_answers(path: &Path) -> Result<AnswerSet> {
    let shown = path.display().to_string();
    let raw = fs::read_to_string(path)
        .with_context(|| trf("cli.survey.error.read_answers", &[&shown]))?;
    serde_json::from_str(&raw).with_context(|| trf("cli.survey.error.parse_answers", &[&shown]))
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Next,
    Back,
    Quit,
    Choose(Vec<String>),
    Text(String),
    Invalid,
}

/// Runs the wizard in a terminal dialogue. Returns `false` when the
/// respondent quits, which discards the session.
pub async fn interact<R: BufRead, W: Write>(
    mut wizard: Wizard,
    prompter: &mut Prompter<R, W>,
) -> Result<bool> {
    prompter.say(&trf(
        "cli.survey.intro",
        &[&wizard.spec().title, &wizard.spec().len().to_string()],
    ))?;

    loop {
        let step = build_render_step(&wizard);
        draw(prompter, &step)?;
        let hint = match step.primary_action {
            PrimaryAction::Finish => tr("cli.survey.prompt.finish"),
            _ => tr("cli.survey.prompt.next"),
        };
        let Some(line) = prompter.ask(&hint)? else {
            bail!(tr("cli.survey.error.stdin_closed"));
        };

        let advanced = match parse_input(&step, &line) {
            Input::Quit => {
                prompter.say(&tr("cli.survey.result.discarded"))?;
                return Ok(false);
            }
            Input::Back => {
                if !wizard.retreat()? {
                    prompter.say(&tr("cli.survey.result.first_question"))?;
                }
                None
            }
            Input::Next => Some(wizard.advance().await?),
            Input::Text(text) => {
                wizard.set_text(text)?;
                Some(wizard.advance().await?)
            }
            Input::Choose(labels) if matches!(step.kind, QuestionKind::Single { .. }) => {
                match labels.as_slice() {
                    [label] => Some(wizard.select_option(label).await?),
                    _ => {
                        prompter.say(&tr("cli.survey.result.invalid_choice"))?;
                        None
                    }
                }
            }
            Input::Choose(labels) => {
                for label in &labels {
                    if wizard.toggle_option(label)? == Toggle::Ignored {
                        let limit = step.limit.unwrap_or_default().to_string();
                        prompter.say(&trf("cli.survey.result.limit_reached", &[&limit]))?;
                    }
                }
                None
            }
            Input::Invalid => {
                prompter.say(&tr("cli.survey.result.invalid_choice"))?;
                None
            }
        };

        if let Some(Advance::Submitted(_)) = advanced {
            return Ok(true);
        }
    }
}

fn draw<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, step: &RenderStep) -> Result<()> {
    prompter.say("")?;
    prompter.say(&trf(
        "cli.survey.step.header",
        &[
            &step.position.to_string(),
            &step.total.to_string(),
            &step.progress_percent.to_string(),
        ],
    ))?;
    prompter.say(&step.prompt)?;

    let instruction = match (&step.kind, step.limit) {
        (QuestionKind::Single { .. }, _) => tr("cli.survey.step.choose_one"),
        (QuestionKind::Text { .. }, _) => tr("cli.survey.step.free_text"),
        (_, Some(limit)) => trf("cli.survey.step.choose_up_to", &[&limit.to_string()]),
        (_, None) => tr("cli.survey.step.choose_any"),
    };
    prompter.say(&format!("  ({instruction})"))?;

    let single = matches!(step.kind, QuestionKind::Single { .. });
    for option in &step.options {
        let mark = match (single, option.selected) {
            (true, true) => "(*)",
            (true, false) => "( )",
            (false, true) => "[x]",
            (false, false) => "[ ]",
        };
        prompter.say(&format!("  {mark} {}. {}", option.position, option.label))?;
    }
    if let Some(text) = step.text.as_deref().filter(|text| !text.is_empty()) {
        prompter.say(&format!("  > {text}"))?;
    } else if let Some(placeholder) = &step.placeholder {
        prompter.say(&format!("  {}", trf("cli.survey.step.placeholder", &[placeholder.as_str()])))?;
    }
    Ok(())
}

/// Commands are `n`/`b`/`q` on choice steps. Free-text steps take any line as
/// the answer, so only the `:n`/`:b`/`:q` forms and an empty line act there.
fn parse_input(step: &RenderStep, line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed {
        "" | ":n" => return Input::Next,
        ":b" => return Input::Back,
        ":q" => return Input::Quit,
        _ => {}
    }
    if matches!(step.kind, QuestionKind::Text { .. }) {
        return Input::Text(line.to_string());
    }
    match trimmed {
        "n" => return Input::Next,
        "b" => return Input::Back,
        "q" => return Input::Quit,
        _ => {}
    }

    if let Some(option) = step.options.iter().find(|option| option.label == trimmed) {
        return Input::Choose(vec![option.label.clone()]);
    }
    let picked: Option<Vec<String>> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let position = token.parse::<usize>().ok()?;
            step.options
                .iter()
                .find(|option| option.position == position)
                .map(|option| option.label.clone())
        })
        .collect();
    match picked {
        Some(labels) if labels.len() == 1 => Input::Choose(labels),
        Some(labels) if !labels.is_empty() && step.kind.is_multi() => Input::Choose(labels),
        _ => Input::Invalid,
    }
}
