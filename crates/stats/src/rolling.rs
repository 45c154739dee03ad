//! Centered, calendar-weighted moving average.

use nino_calendar::days_per_month;
use nino_grid::{AxisRef, AxisTag, Coordinate, LabeledArray, OnMissing, require_axis, resolve};
use tracing::debug;

use crate::error::StatsError;

/// Centered moving average of `window` steps along `axis`.
///
/// Along the time axis every step is weighted by its number of days, so
/// February contributes less than January to a 3-month mean; other axes use
/// unit weights. The window at position `i` covers
/// `[i - window / 2, i - window / 2 + window)`. A position needs at least
/// `min_periods` (default `window`) present values and in-range steps,
/// otherwise it is missing. Missing values are skipped in the weighted sum;
/// the weight sum covers every in-range step.
///
/// # Errors
///
/// Returns [`StatsError::InvalidWindow`] for a zero window or a
/// `min_periods` outside `1..=window`, and the soft
/// [`nino_grid::GridError::UnresolvedAxis`] if `axis` cannot be resolved.
#[tracing::instrument(level = "debug", skip(da, axis), fields(var = da.name(), axis = %axis))]
pub fn moving_average(
    da: &LabeledArray,
    axis: &AxisRef,
    window: usize,
    min_periods: Option<usize>,
) -> Result<LabeledArray, StatsError> {
    if window == 0 {
        return Err(StatsError::InvalidWindow {
            window,
            reason: "must be at least 1".to_string(),
        });
    }
    let min_periods = min_periods.unwrap_or(window);
    if min_periods == 0 || min_periods > window {
        return Err(StatsError::InvalidWindow {
            window,
            reason: format!("min_periods {min_periods} must be in 1..={window}"),
        });
    }
    let dim = require_axis(da, axis, OnMissing::Warn)?;
    let len = da.shape()[da.axis_index(&dim)?];
    let weights = step_weights(da, &dim, len);
    Ok(da.map_lanes(&dim, |lane| centered(lane, &weights, window, min_periods))?)
}

fn step_weights(da: &LabeledArray, dim: &str, len: usize) -> Vec<f64> {
    let is_time = resolve(da, AxisTag::Time).is_some_and(|t| t == dim);
    match da.coord(dim).and_then(Coordinate::as_time) {
        Some((dates, calendar)) if is_time => days_per_month(dates, calendar),
        _ => {
            debug!(dim, "unit weights");
            vec![1.0; len]
        }
    }
}

fn centered(x: &[f64], w: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let n = x.len() as isize;
    let half = (window / 2) as isize;
    (0..n)
        .map(|i| {
            let start = (i - half).max(0);
            let end = (i - half + window as isize).min(n);
            let (mut num, mut den) = (0.0, 0.0);
            let (mut present, mut in_range) = (0usize, 0usize);
            for j in start..end {
                let j = j as usize;
                in_range += 1;
                den += w[j];
                if !x[j].is_nan() {
                    present += 1;
                    num += x[j] * w[j];
                }
            }
            if present < min_periods || in_range < min_periods || den == 0.0 {
                f64::NAN
            } else {
                num / den
            }
        })
        .collect()
}
