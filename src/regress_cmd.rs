//! Regress command: regress a processed field on a processed index.

use anyhow::{Context, Result};
use nino_io::write_dataset;
use nino_stats::linear_regression;
use tracing::{info, info_span};

use crate::cli::RegressArgs;
use crate::config::{RegressConfig, SourceConfig};
use crate::process_cmd::{load, output_path, run_source};

fn variable(label: &str, source: &SourceConfig) -> Result<nino_grid::LabeledArray> {
    let ds = run_source(&source.input, &source.pipeline, source.on_missing)
        .with_context(|| format!("failed to process [{label}]"))?;
    ds.require(&source.variable)
        .cloned()
        .with_context(|| format!("[{label}] has no variable '{}' after its pipeline", source.variable))
}

/// Run both pipelines and the regression.
pub fn run(args: RegressArgs) -> Result<()> {
    let _cmd = info_span!("regress").entered();
    let config: RegressConfig = load(&args.config)?;
    let output = output_path(args.output, config.output.path.clone())?;

    let x = variable("x", &config.x)?;
    let y = variable("y", &config.y)?;
    info!(x = x.name(), y = y.name(), dim = %config.regression.dim, "regressing");

    let result = linear_regression(&x, &y, &config.regression.dim, &config.regression.options())
        .context("regression failed")?
        .into_dataset()
        .with_attr("predictor", x.name())
        .with_attr("predictand", y.name());

    write_dataset(&output, &result).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "done");
    Ok(())
}
