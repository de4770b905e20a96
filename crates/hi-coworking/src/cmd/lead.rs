use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Result, bail};
use clap::Args;
use survey_spec::{DEFAULT_INTERESTS, LeadForm, is_valid_email};

use crate::cmd::i18n::{tr, trf};
use crate::cmd::prompt::Prompter;
use crate::config::Settings;
use crate::gateway;

#[derive(Args, Debug, Clone)]
pub struct LeadArgs {
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,
    /// Interest tag; repeat for several
    #[arg(long = "interest", value_name = "INTEREST")]
    pub interests: Vec<String>,
    /// Print the payload instead of sending it
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
}

pub async fn run(args: LeadArgs, settings: &Settings) -> Result<()> {
    let gateway = gateway::build(settings, args.dry_run)?;

    let mut form = LeadForm::new();
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
        fill_interactive(&mut form, &args, &mut prompter)?;
    } else {
        fill_from_args(&mut form, &args)?;
    }

    form.submit(gateway.as_ref()).await?;
    if !args.dry_run {
        println!("{}", trf("cli.lead.result.thanks", &[form.name()]));
    }
    Ok(())
}

fn fill_from_args(form: &mut LeadForm, args: &LeadArgs) -> Result<()> {
    let (Some(name), Some(email)) = (&args.name, &args.email) else {
        bail!(tr("cli.lead.error.missing_fields"));
    };
    form.set_name(name.trim());
    form.set_email(email.trim());
    form.set_message(args.message.clone().unwrap_or_default());
    apply_interests(form, &args.interests)?;
    form.check()?;
    Ok(())
}

/// Prompts for every field not given on the command line. Name and email
/// are asked again until they pass the form's checks.
fn fill_interactive<R: BufRead, W: Write>(
    form: &mut LeadForm,
    args: &LeadArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let mut name = args.name.clone().unwrap_or_default();
    while name.trim().is_empty() {
        if args.name.is_some() {
            prompter.say(&tr("cli.lead.result.name_required"))?;
        }
        name = ask(prompter, "cli.lead.prompt.name")?;
        if name.trim().is_empty() {
            prompter.say(&tr("cli.lead.result.name_required"))?;
        }
    }
    form.set_name(name.trim());

    let mut email = args.email.clone().unwrap_or_default();
    while !is_valid_email(&email) {
        if !email.trim().is_empty() {
            prompter.say(&tr("cli.lead.result.invalid_email"))?;
        }
        email = ask(prompter, "cli.lead.prompt.email")?;
        if email.trim().is_empty() {
            prompter.say(&tr("cli.lead.result.invalid_email"))?;
        }
    }
    form.set_email(email.trim());

    let message = match &args.message {
        Some(message) => message.clone(),
        None => ask(prompter, "cli.lead.prompt.message")?,
    };
    form.set_message(message);

    if !args.interests.is_empty() {
        return apply_interests(form, &args.interests);
    }
    prompter.say(&tr("cli.lead.step.interests_header"))?;
    for (index, interest) in DEFAULT_INTERESTS.iter().enumerate() {
        prompter.say(&format!("  {}. {interest}", index + 1))?;
    }
    loop {
        let line = ask(prompter, "cli.lead.prompt.interests")?;
        match parse_interest_numbers(&line) {
            Some(picked) => {
                for interest in picked {
                    form.toggle_interest(interest);
                }
                return Ok(());
            }
            None => prompter.say(&tr("cli.lead.result.invalid_interest"))?,
        }
    }
}

fn ask<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, key: &str) -> Result<String> {
    match prompter.ask(&tr(key))? {
        Some(line) => Ok(line),
        None => bail!(tr("cli.lead.error.stdin_closed")),
    }
}

fn apply_interests(form: &mut LeadForm, interests: &[String]) -> Result<()> {
    for interest in interests {
        let Some(known) = DEFAULT_INTERESTS
            .iter()
            .find(|known| known.eq_ignore_ascii_case(interest.trim()))
        else {
            bail!(trf(
                "cli.lead.error.unknown_interest",
                &[interest, &DEFAULT_INTERESTS.join(", ")]
            ));
        };
        if !form.interests().iter().any(|picked| picked == known) {
            form.toggle_interest(known);
        }
    }
    Ok(())
}

/// Parses `1 3` or `1,3` into interest tags; `None` on anything out of range.
fn parse_interest_numbers(line: &str) -> Option<Vec<&'static str>> {
    let mut picked = Vec::new();
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        let position = token.parse::<usize>().ok()?;
        let interest = *DEFAULT_INTERESTS.get(position.checked_sub(1)?)?;
        if !picked.contains(&interest) {
            picked.push(interest);
        }
    }
    Some(picked)
}
