//! Weighted reductions over one or more axes.

use nino_calendar::days_per_month;
use nino_grid::{AxisRef, AxisTag, Coordinate, GridError, LabeledArray, OnMissing, require_axis, resolve};
use tracing::debug;

use crate::error::StatsError;
use crate::series;

/// Weights for [`mean`] and [`variance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Weights {
    /// Unweighted.
    #[default]
    None,
    /// Derived from the coordinates: `cos(latitude)` when reducing over
    /// latitude (alone or together with longitude), days per month when
    /// reducing over time alone, unweighted otherwise.
    Auto,
    /// Explicit weights, broadcast onto the array.
    Explicit(LabeledArray),
}

impl From<bool> for Weights {
    fn from(auto: bool) -> Self {
        if auto { Self::Auto } else { Self::None }
    }
}

/// Mean over `dims`, which are removed from the result.
///
/// A latitude or longitude tag backed by a 2-D coordinate reduces over the
/// grid axis underneath it (the first axis of the coordinate for latitude,
/// the last for longitude). Attributes are kept.
///
/// # Errors
///
/// Returns the soft [`GridError::UnresolvedAxis`] if an axis cannot be
/// resolved, or [`GridError::Broadcast`] if explicit weights do not fit.
#[tracing::instrument(level = "debug", skip_all, fields(var = da.name()))]
pub fn mean(da: &LabeledArray, dims: &[AxisRef], weights: &Weights, skipna: bool) -> Result<LabeledArray, StatsError> {
    reduce(da, dims, weights, |x, w| match w {
        Some(w) => series::weighted_mean(x, w, skipna),
        None if skipna => series::nan_mean(x),
        None => series::mean(x),
    })
}

/// Variance over `dims`.
///
/// Unweighted variance uses an `n - ddof` denominator; weighted variance is
/// the population variance around the weighted mean and ignores `ddof`.
///
/// # Errors
///
/// Same as [`mean`].
pub fn variance(
    da: &LabeledArray,
    dims: &[AxisRef],
    weights: &Weights,
    ddof: usize,
    skipna: bool,
) -> Result<LabeledArray, StatsError> {
    reduce(da, dims, weights, |x, w| match w {
        Some(w) => series::weighted_variance(x, w, skipna),
        None if skipna || x.iter().all(|v| !v.is_nan()) => series::nan_variance(x, ddof),
        None => f64::NAN,
    })
}

/// Standard deviation over `dims`; see [`variance`].
///
/// # Errors
///
/// Same as [`mean`].
pub fn std(
    da: &LabeledArray,
    dims: &[AxisRef],
    weights: &Weights,
    ddof: usize,
    skipna: bool,
) -> Result<LabeledArray, StatsError> {
    Ok(variance(da, dims, weights, ddof, skipna)?.mapv(f64::sqrt))
}

fn reduce(
    da: &LabeledArray,
    dims: &[AxisRef],
    weights: &Weights,
    f: impl Fn(&[f64], Option<&[f64]>) -> f64,
) -> Result<LabeledArray, StatsError> {
    let names = dims
        .iter()
        .map(|d| require_axis(da, d, OnMissing::Warn))
        .collect::<Result<Vec<_>, _>>()?;
    let weights = match weights {
        Weights::None => None,
        Weights::Auto => auto_weights(da, &names)?,
        Weights::Explicit(w) => Some(w.clone()),
    };
    let reduce_dims = structural_dims(da, &names)?;
    let (table, _) = da.split_axes(&reduce_dims)?;
    let weight_table = match &weights {
        Some(w) => {
            let full = w.broadcast_to(da.dims(), da.shape())?;
            Some(da.with_values(full)?.split_axes(&reduce_dims)?.0)
        }
        None => None,
    };
    let values = table
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let x = row.to_vec();
            match &weight_table {
                Some(w) => f(&x, Some(&w.row(i).to_vec())),
                None => f(&x, None),
            }
        })
        .collect();
    Ok(da.reduced(&reduce_dims, values)?)
}

fn auto_weights(da: &LabeledArray, names: &[String]) -> Result<Option<LabeledArray>, StatsError> {
    let lon = resolve(da, AxisTag::Longitude);
    let lat = resolve(da, AxisTag::Latitude);
    if let Some(lat) = &lat {
        let horizontal = names.iter().all(|n| n == lat || Some(n) == lon.as_ref());
        if horizontal && names.contains(lat) {
            let coord = da.coord(lat).ok_or_else(|| GridError::MissingAxis {
                name: lat.clone(),
                available: da.dims().join(", "),
            })?;
            let values = coord.as_numeric().ok_or_else(|| GridError::InvalidCoordinate {
                name: lat.clone(),
                reason: "latitude must be numeric".to_string(),
            })?;
            let cos = values.mapv(|v| v.to_radians().cos());
            return Ok(Some(LabeledArray::new("weights", coord.dims().to_vec(), cos)?));
        }
    }
    let time = resolve(da, AxisTag::Time).filter(|t| names.len() == 1 && names[0] == *t);
    if let Some(time) = time {
        if let Some((dates, calendar)) = da.coord(&time).and_then(Coordinate::as_time) {
            let dpm = days_per_month(dates, calendar);
            return Ok(Some(LabeledArray::series("weights", time, dpm)));
        }
    }
    debug!(dims = ?names, "no automatic weights apply, using unweighted reduction");
    Ok(None)
}

/// Maps resolved names to array axes, translating 2-D latitude/longitude
/// coordinates to the grid axes they span.
fn structural_dims(da: &LabeledArray, names: &[String]) -> Result<Vec<String>, StatsError> {
    let lon = resolve(da, AxisTag::Longitude);
    let lat = resolve(da, AxisTag::Latitude);
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let dim = if da.has_axis(name) {
            name.clone()
        } else {
            let coord_dims = da.coord(name).map(|c| c.dims().to_vec()).unwrap_or_default();
            let picked = if Some(name) == lat.as_ref() {
                coord_dims.first().cloned()
            } else if Some(name) == lon.as_ref() {
                coord_dims.last().cloned()
            } else {
                None
            };
            match picked {
                Some(d) => d,
                None => {
                    da.axis_index(name)?;
                    name.clone()
                }
            }
        };
        if !out.contains(&dim) {
            out.push(dim);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{ArrayD, IxDyn};
    use nino_calendar::{Calendar, CalendarDate, monthly_sequence};

    use super::*;

    fn grid() -> LabeledArray {
        // lat = [0, 60], lon = [0, 10, 20]
        let values = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        LabeledArray::new("ts", ["lat", "lon"], values)
            .unwrap()
            .with_coord("lat", Coordinate::axis("lat", vec![0.0, 60.0]))
            .unwrap()
            .with_coord("lon", Coordinate::axis("lon", vec![0.0, 10.0, 20.0]))
            .unwrap()
    }

    #[test]
    fn unweighted_mean_over_one_axis() {
        let out = mean(&grid(), &["X".into()], &Weights::None, true).unwrap();
        assert_eq!(out.dims(), ["lat"]);
        assert_relative_eq!(out.values()[[0]], 2.0);
        assert_relative_eq!(out.values()[[1]], 5.0);
        assert!(out.coord("lon").is_none());
    }

    #[test]
    fn cos_latitude_weights() {
        let out = mean(&grid(), &["X".into(), "Y".into()], &Weights::Auto, true).unwrap();
        // weights 1 and 0.5
        let expected = (2.0 * 1.0 + 5.0 * 0.5) / 1.5;
        assert_relative_eq!(out.values()[IxDyn(&[])], expected, epsilon = 1e-12);
    }

    #[test]
    fn equal_explicit_weights_match_unweighted() {
        let w = LabeledArray::new("w", ["lat", "lon"], ArrayD::from_elem(IxDyn(&[2, 3]), 0.3)).unwrap();
        let dims: Vec<AxisRef> = vec!["Y".into(), "X".into()];
        let weighted = mean(&grid(), &dims, &Weights::Explicit(w), true).unwrap();
        let plain = mean(&grid(), &dims, &Weights::None, true).unwrap();
        assert_relative_eq!(weighted.values()[IxDyn(&[])], plain.values()[IxDyn(&[])], epsilon = 1e-12);
    }

    #[test]
    fn days_per_month_weights_over_time() {
        let start = CalendarDate::new(Calendar::NoLeap, 2001, 1, 15).unwrap();
        let dates = monthly_sequence(Calendar::NoLeap, start, 2);
        let da = LabeledArray::series("ts", "time", vec![0.0, 1.0])
            .with_coord("time", Coordinate::time("time", dates, Calendar::NoLeap))
            .unwrap();
        let out = mean(&da, &["T".into()], &Weights::Auto, true).unwrap();
        assert_relative_eq!(out.values()[IxDyn(&[])], 28.0 / 59.0, epsilon = 1e-12);
    }

    #[test]
    fn curvilinear_latitude_reduces_grid_axis() {
        let lat = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 0.0, 0.0, 60.0, 60.0, 60.0]).unwrap();
        let lon = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 10.0, 20.0, 0.0, 10.0, 20.0]).unwrap();
        let values = grid().values().clone();
        let da = LabeledArray::new("ts", ["y", "x"], values)
            .unwrap()
            .with_coord("lat", Coordinate::numeric(["y", "x"], lat).unwrap())
            .unwrap()
            .with_coord("lon", Coordinate::numeric(["y", "x"], lon).unwrap())
            .unwrap();
        let out = mean(&da, &["Y".into()], &Weights::None, true).unwrap();
        assert_eq!(out.dims(), ["x"]);
        assert_relative_eq!(out.values()[[0]], 2.5);
        assert!(out.coord("lat").is_none());
    }

    #[test]
    fn unresolved_axis_is_soft() {
        let err = mean(&grid(), &["T".into()], &Weights::Auto, true).unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn skipna_controls_missing() {
        let da = LabeledArray::series("ts", "time", vec![1.0, f64::NAN, 3.0]);
        let skip = mean(&da, &["time".into()], &Weights::None, true).unwrap();
        let keep = mean(&da, &["time".into()], &Weights::None, false).unwrap();
        assert_relative_eq!(skip.values()[IxDyn(&[])], 2.0);
        assert!(keep.values()[IxDyn(&[])].is_nan());
    }

    #[test]
    fn std_population() {
        let da = LabeledArray::series("ts", "time", vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let out = std(&da, &["time".into()], &Weights::None, 0, true).unwrap();
        assert_relative_eq!(out.values()[IxDyn(&[])], 2.0, epsilon = 1e-12);
    }
}
