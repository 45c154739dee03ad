//! Process command: prepare a source, run its pipeline, write the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use nino_grid::{Dataset, OnMissing};
use nino_io::{open_datasets, write_dataset};
use nino_pipeline::{Pipeline, prepare};
use tracing::{info, info_span};

use crate::cli::ProcessArgs;
use crate::config::{InputConfig, ProcessConfig};

/// Reads and parses a TOML configuration file.
pub fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse TOML config: {}", path.display()))
}

/// Opens and prepares `input`, then runs `pipeline` over it.
pub fn run_source(input: &InputConfig, pipeline: &toml::Table, on_missing: OnMissing) -> Result<Dataset> {
    let paths = input.path.to_vec();
    info!(paths = ?paths, "opening source");
    let ds = open_datasets(paths.as_slice(), &input.open_options())
        .with_context(|| format!("failed to open {}", display_paths(&paths)))?;

    let variables = input.variables.as_deref();
    let ds = prepare(&ds, &input.select, variables).context("failed to prepare source")?;

    let mut pipeline = Pipeline::from_specs(pipeline)
        .context("invalid pipeline")?
        .with_on_missing(on_missing);
    if let Some(names) = &input.variables {
        pipeline = pipeline.with_variables(names.clone());
    }
    info!(steps = pipeline.len(), "running pipeline");
    pipeline.apply(&ds).context("pipeline failed")
}

pub fn output_path(cli: Option<PathBuf>, config: Option<PathBuf>) -> Result<PathBuf> {
    cli.or(config)
        .ok_or_else(|| anyhow!("no output path: set [output].path in config or use --output"))
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Run the process pipeline.
pub fn run(args: ProcessArgs) -> Result<()> {
    let _cmd = info_span!("process").entered();
    let config: ProcessConfig = load(&args.config)?;
    let output = output_path(args.output, config.output.path.clone())?;

    let result = run_source(&config.input, &config.pipeline, config.on_missing)?;

    write_dataset(&output, &result).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), variables = result.len(), "done");
    Ok(())
}
