//! Missing-value masks.

use tracing::debug;

use crate::axis::{AxisTag, resolve};
use crate::dataset::Dataset;
use crate::error::GridError;

/// Makes the missing-value mask constant through time.
///
/// A grid point that is missing at any time step becomes missing at every
/// time step. Variables without the time axis are unchanged, and so is a
/// dataset without a resolvable time axis.
///
/// # Errors
///
/// Propagates array errors.
pub fn constant_mask(ds: &Dataset) -> Result<Dataset, GridError> {
    let Some(time) = resolve(ds, AxisTag::Time) else {
        debug!("constant_mask: no time axis");
        return Ok(ds.clone());
    };
    ds.try_map(|var| {
        if !var.has_axis(&time) {
            return Ok(var.clone());
        }
        var.map_lanes(&time, |lane| {
            if lane.iter().any(|v| v.is_nan()) {
                vec![f64::NAN; lane.len()]
            } else {
                lane.to_vec()
            }
        })
    })
}

/// Replaces every occurrence of `sentinel` with `NaN` in every variable.
pub fn mask_value(ds: &Dataset, sentinel: f64) -> Dataset {
    ds.map(|var| var.mapv(|v| if v == sentinel { f64::NAN } else { v }))
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::*;
    use crate::array::LabeledArray;

    fn ds(values: Vec<f64>) -> Dataset {
        let values = ArrayD::from_shape_vec(IxDyn(&[3, 2]), values).unwrap();
        Dataset::from_variables([LabeledArray::new("sst", ["time", "lon"], values).unwrap()]).unwrap()
    }

    #[test]
    fn constant_mask_spreads_through_time() {
        let out = constant_mask(&ds(vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0])).unwrap();
        let v = out.variables()[0].values();
        assert!((0..3).all(|t| v[[t, 0]].is_nan()));
        assert_eq!(v[[2, 1]], 6.0);
    }

    #[test]
    fn mask_value_sentinel() {
        let out = mask_value(&ds(vec![-1000.0, 2.0, 3.0, 4.0, 5.0, -1000.0]), -1000.0);
        let v = out.variables()[0].values();
        assert!(v[[0, 0]].is_nan());
        assert!(v[[2, 1]].is_nan());
        assert_eq!(v[[1, 0]], 3.0);
    }
}
