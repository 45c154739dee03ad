use std::path::PathBuf;

use nino_grid::{AxisRef, AxisTag, OnMissing};
use nino_io::OpenOptions;
use nino_pipeline::SourceOptions;
use nino_stats::{Alternative, RegressionOptions};
use serde::Deserialize;

/// Configuration of `nino process`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessConfig {
    pub input: InputConfig,
    /// Ordered `"<token>--<operator>"` steps.
    #[serde(default)]
    pub pipeline: toml::Table,
    /// `"fail"` turns a missing literal axis in a step into an error.
    #[serde(default)]
    pub on_missing: OnMissing,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration of `nino regress`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegressConfig {
    /// Predictor, typically a climate index.
    pub x: SourceConfig,
    /// Predictand, typically a gridded field.
    pub y: SourceConfig,
    #[serde(default)]
    pub regression: RegressionToml,
    #[serde(default)]
    pub output: OutputConfig,
}

/// One input file or several merged by variable.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputPaths {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl InputPaths {
    pub fn to_vec(&self) -> Vec<PathBuf> {
        match self {
            Self::One(p) => vec![p.clone()],
            Self::Many(ps) => ps.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub path: InputPaths,
    /// Variables to read and process; all data variables when absent.
    #[serde(default)]
    pub variables: Option<Vec<String>>,
    /// Sentinel masked on read.
    #[serde(default)]
    pub fill_value: Option<f64>,
    #[serde(default = "default_true")]
    pub canonicalize: bool,
    /// Region and period selection, regional mean removal, constant mask.
    #[serde(default)]
    pub select: SourceOptions,
}

impl InputConfig {
    pub fn open_options(&self) -> OpenOptions {
        let mut opts = OpenOptions::default().with_canonicalize(self.canonicalize);
        if let Some(names) = &self.variables {
            opts = opts.with_variables(names.iter().cloned());
        }
        if let Some(sentinel) = self.fill_value {
            opts = opts.with_fill_value(sentinel);
        }
        opts
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub pipeline: toml::Table,
    /// Variable regressed once the pipeline has run.
    pub variable: String,
    #[serde(default)]
    pub on_missing: OnMissing,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegressionToml {
    #[serde(default = "default_dim")]
    pub dim: AxisRef,
    #[serde(default)]
    pub alternative: Alternative,
    #[serde(default)]
    pub lag_x: i64,
    #[serde(default)]
    pub lag_y: i64,
    #[serde(default)]
    pub on_missing: OnMissing,
}

impl Default for RegressionToml {
    fn default() -> Self {
        Self {
            dim: default_dim(),
            alternative: Alternative::default(),
            lag_x: 0,
            lag_y: 0,
            on_missing: OnMissing::default(),
        }
    }
}

impl RegressionToml {
    pub fn options(&self) -> RegressionOptions {
        RegressionOptions::new()
            .with_alternative(self.alternative)
            .with_lag_x(self.lag_x)
            .with_lag_y(self.lag_y)
            .with_on_missing(self.on_missing)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_dim() -> AxisRef {
    AxisRef::Tag(AxisTag::Time)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROCESS: &str = r#"
[input]
path = "hadisst.nc"
variables = ["sst"]
fill_value = -1000.0

[input.select]
ensure_constant_mask = true
bounds = { T = ["1979-01-01", "2021-12-31"] }

[pipeline]
"0--netcdf_selector" = { bounds = { X = [190.0, 240.0], Y = [-5.0, 5.0] } }
"1--average" = { dim = ["X", "Y"], weights = true }
"2--detrend" = {}
"3--interannual_anomalies" = {}
"4--season_mean" = { season = "NDJ" }

[output]
path = "nino34.nc"
"#;

    #[test]
    fn process_config_keeps_step_order() {
        let config: ProcessConfig = toml::from_str(PROCESS).unwrap();
        let keys: Vec<&str> = config.pipeline.keys().map(String::as_str).collect();
        assert_eq!(keys[0], "0--netcdf_selector");
        assert_eq!(keys[4], "4--season_mean");
        assert_eq!(config.input.path.to_vec(), vec![PathBuf::from("hadisst.nc")]);
        assert_eq!(config.on_missing, OnMissing::Warn);
        assert!(config.input.select.ensure_constant_mask);
        let opts = config.input.open_options();
        assert_eq!(opts.fill_value, Some(-1000.0));
        assert!(opts.canonicalize);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let text = format!("{PROCESS}\n[plot]\ncmap = \"RdBu\"\n");
        assert!(toml::from_str::<ProcessConfig>(&text).is_err());
    }

    #[test]
    fn regress_config_defaults() {
        let config: RegressConfig = toml::from_str(
            r#"
[x]
variable = "sst"
input = { path = ["a.nc", "b.nc"] }

[y]
variable = "ssh"
input = { path = "c.nc" }
pipeline = { "1--season_mean" = {} }

[regression]
alternative = "greater"
lag_y = 1
on_missing = "fail"
"#,
        )
        .unwrap();
        assert_eq!(config.x.input.path.to_vec().len(), 2);
        assert!(config.x.pipeline.is_empty());
        assert_eq!(config.regression.dim, AxisRef::Tag(AxisTag::Time));
        let opts = config.regression.options();
        assert_eq!(opts.alternative, Alternative::Greater);
        assert_eq!((opts.lag_x, opts.lag_y), (0, 1));
        assert_eq!(opts.on_missing, OnMissing::Fail);
        assert!(config.output.path.is_none());
    }
}
