use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nino gridded climate-field processing.
#[derive(Parser)]
#[command(
    name = "nino",
    version,
    about = "Climate-field pipelines: anomalies, detrending, seasonal means, lead-lag reshaping and regression"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Prepare a source, run a pipeline over it and write the result.
    Process(ProcessArgs),
    /// Regress one processed variable on another.
    Regress(RegressArgs),
    /// List the registered pipeline operators.
    Operators,
}

/// Arguments for the `process` subcommand.
#[derive(clap::Args)]
pub struct ProcessArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "nino.toml")]
    pub config: PathBuf,

    /// Override output path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `regress` subcommand.
#[derive(clap::Args)]
pub struct RegressArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "regress.toml")]
    pub config: PathBuf,

    /// Override output path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
