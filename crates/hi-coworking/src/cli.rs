use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{self, lead::LeadArgs, questions::QuestionsArgs, survey::SurveyArgs};
use crate::config::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "hi-coworking",
    about = "Hi Coworking survey and early-access list",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: hi-coworking.toml in the user config dir)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Submission endpoint; overrides the config file and HI_COWORKING_ENDPOINT
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Survey definition to use instead of the built-in catalog
    #[arg(long, value_name = "SPEC_JSON", global = true)]
    survey: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Take the survey, or replay an answers file
    Survey(SurveyArgs),
    /// Join the early-access list
    Lead(LeadArgs),
    /// Print the survey questions
    Questions(QuestionsArgs),
    /// Print the JSON Schema of survey definition files
    Schema,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let overrides = Overrides {
        config: cli.config,
        endpoint: cli.endpoint,
        survey: cli.survey,
    };
    match cli.command {
        Commands::Schema => cmd::questions::schema(),
        Commands::Questions(args) => {
            let settings = Settings::load(&overrides)?;
            cmd::questions::run(&args, &settings)
        }
        Commands::Survey(args) => {
            let settings = Settings::load(&overrides)?;
            runtime()?.block_on(cmd::survey::run(args, &settings))
        }
        Commands::Lead(args) => {
            let settings = Settings::load(&overrides)?;
            runtime()?.block_on(cmd::lead::run(args, &settings))
        }
    }
}

/// Logs go to stderr so stdout stays clean for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
}
