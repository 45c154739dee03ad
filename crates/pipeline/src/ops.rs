//! Pipeline operators and their settings.
//!
//! Every operator is a settings struct deserialized from the table attached
//! to its pipeline key. Unknown fields are rejected.

use std::fmt;

use nino_grid::{AxisRef, AxisTag, Bounds, Dataset, LabeledArray, OnMissing, require_axis, select};
use nino_stats::{
    Season, StatsError, Weights, interannual_anomalies, mean, moving_average, normalize, remove_fit,
    reshape_lead_lag, season_mean, seasonal_cycle,
};
use serde::{Deserialize, Deserializer};

/// A dataset transformation configured from a pipeline table.
pub trait Operator: fmt::Debug {
    /// Applies the operator. `variables` is the pipeline's variable list;
    /// `None` means the data variables of `ds`.
    fn apply(&self, ds: &Dataset, variables: Option<&[String]>) -> Result<Dataset, StatsError>;

    /// Axes named in the settings; literal names among them are checked
    /// against the input before the operator runs.
    fn axes(&self) -> Vec<AxisRef> {
        Vec::new()
    }
}

/// Runs `f` on the selected variables and returns only those.
fn on_selected(
    ds: &Dataset,
    variables: Option<&[String]>,
    f: impl FnMut(&LabeledArray) -> Result<LabeledArray, StatsError>,
) -> Result<Dataset, StatsError> {
    let names = ds.get_variables(variables);
    ds.subset(&names)?.try_map(f)
}

/// Runs `f` on every data variable spanning `axis`; other variables pass
/// through unchanged.
fn on_axis(
    ds: &Dataset,
    axis: &AxisRef,
    f: impl FnMut(&LabeledArray) -> Result<LabeledArray, StatsError>,
) -> Result<Dataset, StatsError> {
    let dim = require_axis(ds, axis, OnMissing::Warn)?;
    let names: Vec<String> = ds
        .data_variable_names()
        .into_iter()
        .filter(|n| ds.variable(n).is_some_and(|v| v.has_axis(&dim)))
        .collect();
    ds.map_variables(&names, f)
}

fn time() -> AxisRef {
    AxisRef::Tag(AxisTag::Time)
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<AxisRef>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Axes {
        One(AxisRef),
        Many(Vec<AxisRef>),
    }
    Ok(match Axes::deserialize(deserializer)? {
        Axes::One(axis) => vec![axis],
        Axes::Many(axes) => axes,
    })
}

/// `average`: (weighted) mean over one or more axes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Average {
    /// Axes to reduce, a single axis or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub dim: Vec<AxisRef>,
    /// Use cos(latitude) or days-per-month weights where they apply.
    pub weights: bool,
    pub skipna: bool,
}

impl Default for Average {
    fn default() -> Self {
        Self {
            dim: vec![time()],
            weights: false,
            skipna: false,
        }
    }
}

impl Operator for Average {
    fn apply(&self, ds: &Dataset, variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        let weights = Weights::from(self.weights);
        on_selected(ds, variables, |v| mean(v, &self.dim, &weights, self.skipna))
    }

    fn axes(&self) -> Vec<AxisRef> {
        self.dim.clone()
    }
}

/// `average_moving`: centered, calendar-weighted moving average.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AverageMoving {
    pub dim: AxisRef,
    pub window: usize,
    /// Present values needed per window; defaults to `window`.
    pub min_periods: Option<usize>,
}

impl Default for AverageMoving {
    fn default() -> Self {
        Self {
            dim: time(),
            window: 3,
            min_periods: None,
        }
    }
}

impl Operator for AverageMoving {
    fn apply(&self, ds: &Dataset, _variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        on_axis(ds, &self.dim, |v| moving_average(v, &self.dim, self.window, self.min_periods))
    }

    fn axes(&self) -> Vec<AxisRef> {
        vec![self.dim.clone()]
    }
}

/// `detrend`: removes a polynomial fit along time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Detrend {
    pub deg: usize,
}

impl Default for Detrend {
    fn default() -> Self {
        Self { deg: 1 }
    }
}

impl Operator for Detrend {
    fn apply(&self, ds: &Dataset, variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        on_selected(ds, variables, |v| remove_fit(v, self.deg, &time()))
    }
}

/// `interannual_anomalies`: removes the monthly climatology.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterannualAnomalies {}

impl Operator for InterannualAnomalies {
    fn apply(&self, ds: &Dataset, _variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        Ok(on_axis(ds, &time(), interannual_anomalies)?.remove_unused_coordinates())
    }
}

/// `netcdf_selector`: selects a region and period.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundsSelect {
    pub bounds: Bounds,
}

impl Operator for BoundsSelect {
    fn apply(&self, ds: &Dataset, _variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        Ok(select(ds, &self.bounds)?)
    }

    fn axes(&self) -> Vec<AxisRef> {
        self.bounds.entries().iter().map(|(axis, _)| axis.clone()).collect()
    }
}

/// `normalize`: divides by the standard deviation along time.
///
/// Every data variable is scaled; only the pipeline's variables have their
/// `units` blanked.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Normalize {
    pub ddof: usize,
}

impl Operator for Normalize {
    fn apply(&self, ds: &Dataset, variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        let listed = ds.get_variables(variables);
        on_axis(ds, &time(), |v| {
            let out = normalize(v, self.ddof)?;
            if listed.iter().any(|n| n == v.name()) {
                Ok(out)
            } else {
                Ok(out.with_attrs(v.attrs().clone()))
            }
        })
    }
}

/// `reshape_lead_lag`: overlapping windows along time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReshapeLeadLag {
    pub delta: usize,
    pub window: usize,
}

impl Default for ReshapeLeadLag {
    fn default() -> Self {
        Self { delta: 12, window: 24 }
    }
}

impl Operator for ReshapeLeadLag {
    fn apply(&self, ds: &Dataset, variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        on_selected(ds, variables, |v| reshape_lead_lag(v, self.delta, self.window))
    }
}

/// `season_mean`: 3-month mean of one season per year.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonMean {
    pub season: Season,
    pub min_periods: Option<usize>,
}

impl Operator for SeasonMean {
    fn apply(&self, ds: &Dataset, _variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        on_axis(ds, &time(), |v| season_mean(v, self.season, self.min_periods))
    }
}

/// `seasonal_cycle`: monthly climatology.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonalCycle {}

impl Operator for SeasonalCycle {
    fn apply(&self, ds: &Dataset, _variables: Option<&[String]>) -> Result<Dataset, StatsError> {
        on_axis(ds, &time(), seasonal_cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_accepts_one_or_many_axes() {
        let one: Average = toml::from_str("dim = \"X\"").unwrap();
        assert_eq!(one.dim, vec![AxisRef::Tag(AxisTag::Longitude)]);
        let many: Average = toml::from_str("dim = [\"X\", \"Y\"]\nweights = true").unwrap();
        assert_eq!(many.dim.len(), 2);
        assert!(many.weights);
        assert!(!many.skipna);
    }

    #[test]
    fn defaults_apply_to_empty_tables() {
        let avg: AverageMoving = toml::from_str("").unwrap();
        assert_eq!(avg, AverageMoving::default());
        assert_eq!(avg.window, 3);
        let reshape: ReshapeLeadLag = toml::from_str("").unwrap();
        assert_eq!((reshape.delta, reshape.window), (12, 24));
        let season: SeasonMean = toml::from_str("").unwrap();
        assert_eq!(season.season, Season::Ndj);
        let detrend: Detrend = toml::from_str("").unwrap();
        assert_eq!(detrend.deg, 1);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<Detrend>("deg = 2\ndegree = 3").is_err());
        assert!(toml::from_str::<SeasonalCycle>("skipna = true").is_err());
    }

    #[test]
    fn season_is_parsed_case_insensitively() {
        let season: SeasonMean = toml::from_str("season = \"djf\"\nmin_periods = 2").unwrap();
        assert_eq!(season.season, Season::Djf);
        assert_eq!(season.min_periods, Some(2));
        assert!(toml::from_str::<SeasonMean>("season = \"XYZ\"").is_err());
    }

    #[test]
    fn configured_axes_are_listed() {
        let avg: Average = toml::from_str("dim = [\"X\", \"lev\"]").unwrap();
        assert_eq!(avg.axes(), [AxisRef::Tag(AxisTag::Longitude), AxisRef::Name("lev".to_string())]);
        assert!(Detrend::default().axes().is_empty());
    }

    #[test]
    fn selector_reads_bounds() {
        let sel: BoundsSelect = toml::from_str("bounds = { T = [\"1980-01-01\", \"1989-12-31\"], X = [-170.0, -120.0] }").unwrap();
        assert_eq!(sel.bounds.entries().len(), 2);
    }
}
