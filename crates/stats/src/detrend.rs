//! Polynomial trend removal.

use nino_grid::{AxisRef, GridError, LabeledArray, OnMissing, require_axis};
use tracing::debug;

use crate::error::StatsError;
use crate::lstsq::PolyFit;

/// Removes a least-squares polynomial fit of degree `deg` along `dim`.
///
/// The abscissa is the axis coordinate (days since 0000-01-01 for a time
/// axis). Each lane is fitted on its present values; a lane with too few
/// of them becomes entirely missing. Returns the residual, not the fit.
///
/// # Errors
///
/// Returns the soft [`GridError::UnresolvedAxis`] if `dim` cannot be
/// resolved, or [`GridError::InvalidCoordinate`] if its coordinate is not 1-D.
#[tracing::instrument(level = "debug", skip(da, dim), fields(var = da.name(), dim = %dim))]
pub fn remove_fit(da: &LabeledArray, deg: usize, dim: &AxisRef) -> Result<LabeledArray, StatsError> {
    let name = require_axis(da, dim, OnMissing::Warn)?;
    da.axis_index(&name)?;
    let x: Vec<f64> = da
        .coord(&name)
        .filter(|c| c.ndim() == 1)
        .ok_or_else(|| GridError::InvalidCoordinate {
            name: name.clone(),
            reason: "polynomial fits need a 1-D coordinate".to_string(),
        })?
        .to_f64()
        .iter()
        .copied()
        .collect();
    let mut unfitted = 0usize;
    let out = da.map_lanes(&name, |lane| {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(lane)
            .filter(|(_, y)| y.is_finite())
            .map(|(&a, &b)| (a, b))
            .unzip();
        match PolyFit::fit(&xs, &ys, deg) {
            Some(fit) => lane.iter().zip(&x).map(|(&y, &t)| y - fit.eval(t)).collect(),
            None => {
                unfitted += 1;
                vec![f64::NAN; lane.len()]
            }
        }
    })?;
    if unfitted > 0 {
        debug!(unfitted, deg, "lanes with too few values for the fit");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{ArrayD, IxDyn};
    use nino_calendar::{Calendar, CalendarDate, monthly_sequence};
    use nino_grid::Coordinate;

    use super::*;

    #[test]
    fn removes_linear_trend_per_lane() {
        let values = ArrayD::from_shape_fn(IxDyn(&[10, 2]), |ix| {
            let t = ix[0] as f64;
            if ix[1] == 0 { 2.0 * t + 1.0 } else { -t }
        });
        let da = LabeledArray::new("ts", ["x", "lat"], values).unwrap();
        let out = remove_fit(&da, 1, &"x".into()).unwrap();
        for v in out.values() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn time_axis_uses_calendar_days() {
        let start = CalendarDate::new(Calendar::Standard, 1980, 1, 15).unwrap();
        let dates = monthly_sequence(Calendar::Standard, start, 24);
        let days: Vec<f64> = dates.iter().map(|d| d.ordinal_days(Calendar::Standard)).collect();
        let values: Vec<f64> = days.iter().map(|d| 0.01 * d).collect();
        let da = LabeledArray::series("ts", "time", values)
            .with_coord("time", Coordinate::time("time", dates, Calendar::Standard))
            .unwrap();
        let out = remove_fit(&da, 1, &"T".into()).unwrap();
        for v in out.values() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut values: Vec<f64> = (0..8).map(|i| 3.0 * f64::from(i)).collect();
        values[2] = f64::NAN;
        let da = LabeledArray::series("ts", "x", values);
        let out = remove_fit(&da, 1, &"x".into()).unwrap();
        assert!(out.values()[[2]].is_nan());
        assert_abs_diff_eq!(out.values()[[7]], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn short_lane_becomes_missing() {
        let da = LabeledArray::series("ts", "x", vec![1.0, f64::NAN, f64::NAN]);
        let out = remove_fit(&da, 1, &"x".into()).unwrap();
        assert!(out.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn unresolved_axis_is_soft() {
        let da = LabeledArray::series("ts", "x", vec![1.0, 2.0]);
        assert!(remove_fit(&da, 1, &"T".into()).unwrap_err().is_soft());
    }
}
