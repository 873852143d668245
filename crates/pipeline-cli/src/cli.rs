//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pipeline_cli::commands::StepRequest;
use pipeline_steps::Step;

#[derive(Parser)]
#[command(
    name = "pipeline",
    version,
    about = "Validate dataset inputs against their JSON Schema",
    long_about = "Run a pipeline validation step on a step event.\n\n\
                  Input objects are read from a local directory laid out like the bucket.\n\
                  The updated step data is written as JSON to stdout or --output."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow dataset values to appear in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a CSV input object and validate its rows.
    ValidateCsv(StepArgs),

    /// Validate inline input events or one JSON input object.
    ValidateJson(StepArgs),
}

impl Command {
    pub fn step(&self) -> (Step, &StepArgs) {
        match self {
            Command::ValidateCsv(args) => (Step::ValidateCsv, args),
            Command::ValidateJson(args) => (Step::ValidateJson, args),
        }
    }
}

#[derive(Args)]
pub struct StepArgs {
    /// Step event JSON file.
    #[arg(long = "event", value_name = "FILE")]
    pub event: PathBuf,

    /// Directory holding the input objects, keyed by their path below it.
    #[arg(long = "store", value_name = "DIR", default_value = ".")]
    pub store: PathBuf,

    /// Write the step data here instead of stdout.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Attempts per storage call before giving up.
    #[arg(long = "attempts", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: u32,

    /// Do not print the findings table to stderr.
    #[arg(long = "quiet-summary")]
    pub quiet_summary: bool,
}

impl StepArgs {
    pub fn request(&self) -> StepRequest {
        StepRequest {
            event: self.event.clone(),
            store: self.store.clone(),
            attempts: self.attempts,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
