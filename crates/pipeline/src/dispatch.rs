//! Ordered application of configured operators.

use nino_grid::{Dataset, GridError, OnMissing, check_axis};
use nino_stats::StatsError;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::ops::Operator;
use crate::registry::{lookup, operator_names};

/// Separator between a key's ordering token and its operator name.
pub const KEY_SEPARATOR: &str = "--";

/// One configured pipeline step.
#[derive(Debug)]
struct Step {
    key: String,
    operator: Box<dyn Operator>,
}

/// A sequence of operators read from a table of `"<token>--<name>"` keys.
///
/// Steps run in table order; the token only tells repeated operators apart.
#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
    variables: Option<Vec<String>>,
    on_missing: OnMissing,
}

impl Pipeline {
    /// Builds a pipeline from `specs`, in iteration order.
    ///
    /// Keys naming an unknown operator are logged and skipped. A value that
    /// is not a table, or a table the operator rejects, is an error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for unparsable settings.
    pub fn from_specs(specs: &toml::Table) -> Result<Self, PipelineError> {
        let mut steps = Vec::with_capacity(specs.len());
        for (key, settings) in specs {
            let name = operator_name(key);
            let Some(builder) = lookup(name) else {
                warn!(operator = name, known = ?operator_names(), "unknown operator, step skipped");
                continue;
            };
            if !settings.is_table() {
                return Err(PipelineError::InvalidConfig {
                    key: key.clone(),
                    reason: format!("expected a table of settings, found {}", settings.type_str()),
                });
            }
            let operator = builder(settings.clone()).map_err(|e| PipelineError::InvalidConfig {
                key: key.clone(),
                reason: e.message().to_string(),
            })?;
            steps.push(Step {
                key: key.clone(),
                operator,
            });
        }
        debug!(steps = steps.len(), "pipeline built");
        Ok(Self {
            steps,
            ..Self::default()
        })
    }

    /// Restricts per-variable operators to `variables`.
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Sets how a literal axis name missing from a step's input is treated.
    ///
    /// With [`OnMissing::Fail`] the step fails with
    /// [`GridError::MissingAxis`]; with the default [`OnMissing::Warn`]
    /// the step halts the pipeline like any unresolved axis.
    pub fn with_on_missing(mut self, on_missing: OnMissing) -> Self {
        self.on_missing = on_missing;
        self
    }

    /// Keys of the steps that will run, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step on `ds`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Halted`] when a step does not apply to its
    /// input and [`PipelineError::Step`] when one fails. Later steps do not
    /// run in either case.
    #[tracing::instrument(level = "debug", skip_all, fields(steps = self.steps.len()))]
    pub fn apply(&self, ds: &Dataset) -> Result<Dataset, PipelineError> {
        let mut current = ds.clone();
        for step in &self.steps {
            info!(step = %step.key, "applying");
            current = self
                .check_axes(step, &current)
                .map_err(StatsError::from)
                .and_then(|()| step.operator.apply(&current, self.variables.as_deref()))
                .map_err(|e| PipelineError::from_step(&step.key, e))?;
            debug!(step = %step.key, variables = ?current.names().collect::<Vec<_>>(), "done");
        }
        Ok(current)
    }

    fn check_axes(&self, step: &Step, ds: &Dataset) -> Result<(), GridError> {
        if self.on_missing == OnMissing::Warn {
            return Ok(());
        }
        for axis in step.operator.axes() {
            check_axis(ds, &axis, self.on_missing)?;
        }
        Ok(())
    }
}

/// Operator name of a pipeline key: the text after the last separator.
pub fn operator_name(key: &str) -> &str {
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_last_separator() {
        assert_eq!(operator_name("1--average"), "average");
        assert_eq!(operator_name("a--b--season_mean"), "season_mean");
        assert_eq!(operator_name("detrend"), "detrend");
    }

    #[test]
    fn unknown_operators_are_skipped() {
        let specs: toml::Table = toml::from_str("[\"1--detrend\"]\n[\"2--plot\"]\n[\"3--normalize\"]\nddof = 1").unwrap();
        let pipeline = Pipeline::from_specs(&specs).unwrap();
        assert_eq!(pipeline.keys().collect::<Vec<_>>(), ["1--detrend", "3--normalize"]);
    }

    #[test]
    fn order_follows_the_table_not_the_tokens() {
        let specs: toml::Table =
            toml::from_str("[\"b--season_mean\"]\n[\"a--detrend\"]\n[\"c--seasonal_cycle\"]").unwrap();
        let pipeline = Pipeline::from_specs(&specs).unwrap();
        assert_eq!(
            pipeline.keys().collect::<Vec<_>>(),
            ["b--season_mean", "a--detrend", "c--seasonal_cycle"]
        );
    }

    fn time_only() -> Dataset {
        Dataset::from_variables([nino_grid::LabeledArray::series("sst", "time", vec![1.0, 2.0, 3.0])]).unwrap()
    }

    #[test]
    fn missing_literal_axis_halts_by_default() {
        let specs: toml::Table = toml::from_str("[\"1--average\"]\ndim = \"lev\"").unwrap();
        let err = Pipeline::from_specs(&specs).unwrap().apply(&time_only()).unwrap_err();
        assert!(err.is_halt());
    }

    #[test]
    fn missing_literal_axis_fails_when_required() {
        let specs: toml::Table = toml::from_str("[\"1--average\"]\ndim = \"lev\"").unwrap();
        let pipeline = Pipeline::from_specs(&specs).unwrap().with_on_missing(OnMissing::Fail);
        match pipeline.apply(&time_only()) {
            Err(PipelineError::Step { step, source }) => {
                assert_eq!(step, "1--average");
                assert!(matches!(source, StatsError::Grid(GridError::MissingAxis { .. })));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn present_literal_axis_runs_when_required() {
        let specs: toml::Table = toml::from_str("[\"1--average\"]\ndim = \"time\"").unwrap();
        let pipeline = Pipeline::from_specs(&specs).unwrap().with_on_missing(OnMissing::Fail);
        let out = pipeline.apply(&time_only()).unwrap();
        assert_eq!(out.require("sst").unwrap().values().iter().copied().collect::<Vec<_>>(), [2.0]);
    }

    #[test]
    fn bad_settings_are_reported_with_their_key() {
        let specs: toml::Table = toml::from_str("[\"1--average_moving\"]\nwindow = 3\nwidth = 5").unwrap();
        match Pipeline::from_specs(&specs) {
            Err(PipelineError::InvalidConfig { key, reason }) => {
                assert_eq!(key, "1--average_moving");
                assert!(reason.contains("width"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let specs: toml::Table = toml::from_str("\"1--detrend\" = 2").unwrap();
        assert!(Pipeline::from_specs(&specs).is_err());
    }
}
