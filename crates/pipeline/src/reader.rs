//! Preparation of a freshly opened source dataset.

use nino_grid::{Bounds, Dataset, constant_mask, select};
use nino_stats::{Weights, remove_regional_mean};
use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineError;

/// Step name reported in errors raised while preparing a source.
pub const READER_STEP: &str = "reader";

/// Regional mean removed from the whole field before selection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionalMean {
    /// Region to average. Empty bounds disable the removal.
    pub bounds: Bounds,
    /// Weight the spatial mean by cos(latitude).
    pub weights: bool,
}

/// How a source is cut down before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceOptions {
    /// Region and period to keep.
    pub bounds: Bounds,
    /// Mask every point that is missing at any time step.
    pub ensure_constant_mask: bool,
    pub remove_regional_mean: Option<RegionalMean>,
}

impl SourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_constant_mask(mut self, enabled: bool) -> Self {
        self.ensure_constant_mask = enabled;
        self
    }

    pub fn with_regional_mean(mut self, regional: RegionalMean) -> Self {
        self.remove_regional_mean = Some(regional);
        self
    }
}

/// Applies `options` to `ds`: regional-mean removal on the selected
/// `variables`, then bounds selection, then the constant mask.
///
/// # Errors
///
/// Failures are reported against the [`READER_STEP`] step, as
/// [`PipelineError::Halted`] or [`PipelineError::Step`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn prepare(ds: &Dataset, options: &SourceOptions, variables: Option<&[String]>) -> Result<Dataset, PipelineError> {
    let fail = |e| PipelineError::from_step(READER_STEP, e);
    let mut ds = ds.clone();
    if let Some(regional) = options.remove_regional_mean.as_ref().filter(|r| !r.bounds.is_empty()) {
        debug!("removing regional mean");
        let weights = Weights::from(regional.weights);
        ds = remove_regional_mean(&ds, &regional.bounds, &weights, variables).map_err(fail)?;
    }
    ds = select(&ds, &options.bounds).map_err(|e| fail(e.into()))?;
    if options.ensure_constant_mask {
        ds = constant_mask(&ds).map_err(|e| fail(e.into()))?;
    }
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};
    use nino_grid::{Coordinate, LabeledArray};

    use super::*;

    fn field() -> Dataset {
        // time 3, lon 4; lon 90 missing once
        let mut values = ArrayD::from_shape_fn(IxDyn(&[3, 4]), |ix| (ix[0] * 10 + ix[1]) as f64);
        values[[1, 1]] = f64::NAN;
        let var = LabeledArray::new("ts", ["time", "lon"], values)
            .unwrap()
            .with_coord("lon", Coordinate::axis("lon", vec![0.0, 90.0, 180.0, 270.0]))
            .unwrap();
        Dataset::from_variables([var]).unwrap()
    }

    #[test]
    fn options_read_from_toml() {
        let opts: SourceOptions = toml::from_str(
            "ensure_constant_mask = true\n[bounds]\nX = [0.0, 200.0]\n[remove_regional_mean]\nbounds = { X = [0.0, 360.0] }",
        )
        .unwrap();
        assert!(opts.ensure_constant_mask);
        assert_eq!(opts.bounds.entries().len(), 1);
        assert!(opts.remove_regional_mean.is_some());
        assert!(toml::from_str::<SourceOptions>("filename = \"a.nc\"").is_err());
    }

    #[test]
    fn constant_mask_spreads_gaps_through_time() {
        let opts = SourceOptions::new().with_constant_mask(true);
        let out = prepare(&field(), &opts, None).unwrap();
        let v = out.variables()[0].values();
        assert!((0..3).all(|t| v[[t, 1]].is_nan()));
        assert_eq!(v[[2, 3]], 23.0);
    }

    #[test]
    fn bounds_are_applied() {
        let opts = SourceOptions::new().with_bounds(Bounds::new().with_degrees("X", 100.0, 300.0));
        let out = prepare(&field(), &opts, None).unwrap();
        assert_eq!(out.variables()[0].shape(), [3, 2]);
    }

    #[test]
    fn missing_spatial_axes_halt_the_reader() {
        let var = LabeledArray::series("ts", "step", vec![1.0, 2.0]);
        let ds = Dataset::from_variables([var]).unwrap();
        let opts = SourceOptions::new().with_regional_mean(RegionalMean {
            bounds: Bounds::new().with_degrees("X", 0.0, 10.0),
            weights: false,
        });
        let err = prepare(&ds, &opts, None).unwrap_err();
        assert!(err.is_halt());
    }
}
