pub mod interactive;
pub mod render;

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::io::BufReader;

use crate::commands::prediction::{prediction_health, prediction_submit_values};
use crate::commands::{AppState, CommandError};
use crate::error::{AppError, AppResult};
use crate::models::form::{FormValues, DEFAULT_DEADLINES, DEFAULT_PRODUCTIVITY};
use crate::services::prediction_service::PredictionClientConfig;
use crate::utils::logger::init_logging;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "stress-predictor",
    about = "Predict your stress level from a few work-life balance metrics",
    version
)]
pub struct Cli {
    /// Base URL of the prediction service. Defaults to $STRESS_PREDICTOR_API_URL.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Give up on the service after this many seconds. Waits forever when unset.
    #[arg(long = "timeout-secs", global = true)]
    pub timeout_secs: Option<u64>,

    /// Also write daily-rolling log files into this directory.
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit the five metrics once and print the result.
    Predict(PredictArgs),

    /// Fill in the form line by line and submit as often as you like.
    Interactive,

    /// Check whether the prediction service has its model loaded.
    Health(OutputArgs),
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Working hours per day (0-24).
    #[arg(long = "work-hours")]
    pub work_hours: String,

    /// Deadlines per week (1-10).
    #[arg(long, default_value = DEFAULT_DEADLINES)]
    pub deadlines: String,

    /// Sleeping hours per day (0-24).
    #[arg(long = "sleep-hours")]
    pub sleep_hours: String,

    /// Productivity metric in percent (10-100).
    #[arg(long, default_value = DEFAULT_PRODUCTIVITY)]
    pub productivity: String,

    /// remote, hybrid or onsite (or 0, 1, 2).
    #[arg(long = "work-type")]
    pub work_type: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl From<&PredictArgs> for FormValues {
    fn from(args: &PredictArgs) -> Self {
        Self {
            work_hours: args.work_hours.clone(),
            deadlines: args.deadlines.clone(),
            sleep_hours: args.sleep_hours.clone(),
            productivity: args.productivity.clone(),
            work_type: args.work_type.clone(),
        }
    }
}

impl Cli {
    /// CLI flag first, then the environment, then the built-in default.
    pub fn client_config(&self) -> PredictionClientConfig {
        let config = match &self.api_url {
            Some(url) if !url.trim().is_empty() => PredictionClientConfig::new(url.trim()),
            _ => PredictionClientConfig::from_env(),
        };
        config.with_timeout(self.timeout_secs.map(StdDuration::from_secs))
    }
}

/// Runs the parsed command and returns the process exit code.
pub async fn run(cli: Cli) -> AppResult<i32> {
    init_logging(cli.log_dir.as_deref())?;

    let config = cli.client_config();
    let app_state = AppState::new(&config)?;

    match &cli.command {
        Commands::Predict(args) => {
            let outcome = prediction_submit_values(&app_state, FormValues::from(args)).await;
            Ok(emit(outcome, args.output.json, render::render_outcome))
        }
        Commands::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            interactive::run_session(&app_state, stdin, tokio::io::stdout()).await?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Health(output) => {
            let status = prediction_health(&app_state).await;
            Ok(emit(status, output.json, render::render_health))
        }
    }
}

fn emit<T: Serialize>(
    outcome: Result<T, CommandError>,
    json: bool,
    render_text: impl Fn(&T) -> String,
) -> i32 {
    match outcome {
        Ok(value) => {
            if json {
                print_json(&value);
            } else {
                print!("{}", render_text(&value));
            }
            EXIT_SUCCESS
        }
        Err(error) => {
            if json {
                print_json(&error);
            } else {
                eprint!("{}", render::render_error(&error));
            }
            EXIT_FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("{}", AppError::from(err)),
    }
}
