//! Removal of a regional spatial mean.

use nino_grid::{AxisRef, AxisTag, Bounds, Dataset, select};
use tracing::debug;

use crate::error::StatsError;
use crate::weighted::{Weights, mean};

/// Subtracts from every listed variable its mean over the region `bounds`.
///
/// The region is selected with [`select`], averaged over longitude and
/// latitude, and the resulting series is broadcast back over the whole
/// field. `variables` defaults to the data variables.
///
/// # Errors
///
/// Propagates selection and reduction errors; the soft
/// [`nino_grid::GridError::UnresolvedAxis`] when the region has no
/// longitude or latitude axis.
#[tracing::instrument(level = "debug", skip_all)]
pub fn remove_regional_mean(
    ds: &Dataset,
    bounds: &Bounds,
    weights: &Weights,
    variables: Option<&[String]>,
) -> Result<Dataset, StatsError> {
    let region = select(ds, bounds)?;
    let dims = [AxisRef::Tag(AxisTag::Longitude), AxisRef::Tag(AxisTag::Latitude)];
    let names = ds.get_variables(variables);
    debug!(variables = ?names, "removing regional mean");
    ds.map_variables(&names, |var| -> Result<_, StatsError> {
        let regional = mean(region.require(var.name())?, &dims, weights, true)?;
        Ok(var.zip_with(&regional, |v, r| v - r)?)
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{ArrayD, IxDyn};
    use nino_grid::{Coordinate, LabeledArray};

    use super::*;

    #[test]
    fn regional_mean_is_removed_everywhere() {
        // time 2, lat 1, lon 4 with lon = 0, 90, 180, 270
        let values = ArrayD::from_shape_vec(IxDyn(&[2, 1, 4]), vec![1.0, 3.0, 10.0, 20.0, 2.0, 4.0, 30.0, 40.0]).unwrap();
        let var = LabeledArray::new("ts", ["time", "lat", "lon"], values)
            .unwrap()
            .with_coord("lat", Coordinate::axis("lat", vec![0.0]))
            .unwrap()
            .with_coord("lon", Coordinate::axis("lon", vec![0.0, 90.0, 180.0, 270.0]))
            .unwrap();
        let ds = Dataset::from_variables([var]).unwrap();
        let bounds = Bounds::new().with_degrees("X", 0.0, 100.0).with_degrees("Y", -10.0, 10.0);
        let out = remove_regional_mean(&ds, &bounds, &Weights::None, None).unwrap();
        let v = out.variables()[0].values();
        assert_relative_eq!(v[[0, 0, 0]], -1.0);
        assert_relative_eq!(v[[0, 0, 3]], 18.0);
        assert_relative_eq!(v[[1, 0, 2]], 27.0);
    }
}
