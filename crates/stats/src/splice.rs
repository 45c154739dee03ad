//! Lead-lag reshaping into overlapping fixed-length windows.

use ndarray::{ArrayD, Axis, IxDyn};
use nino_grid::{AxisRef, AxisTag, Coordinate, GridError, LabeledArray, OnMissing, require_axis, resolve};
use tracing::debug;

use crate::error::StatsError;

/// Number of windows [`splice`] emits for a sequence of length `len`.
pub fn segment_count(len: usize, delta: usize, window: usize) -> usize {
    if delta == 0 {
        return 0;
    }
    let half = window / 2;
    // start index runs from -(half - delta) to len - (half + delta)
    let first = delta as isize - half as isize;
    let last = len as isize - (half + delta) as isize;
    if last < first {
        0
    } else {
        ((last - first) as usize) / delta + 1
    }
}

/// Cuts `seq` into overlapping windows of length `window`, one every
/// `delta` steps.
///
/// With `half = window / 2`, window starts run from `delta - half` to
/// `len - half - delta` inclusive. Parts of a window falling outside the
/// sequence are `NaN`, so every window has exactly `window` values.
pub fn splice(seq: &[f64], delta: usize, window: usize) -> Vec<Vec<f64>> {
    let n = segment_count(seq.len(), delta, window);
    let len = seq.len() as isize;
    let first = delta as isize - (window / 2) as isize;
    (0..n)
        .map(|s| {
            let k = first + (s * delta) as isize;
            let mut out = vec![f64::NAN; window];
            let lo = k.max(0);
            let hi = (k + window as isize).min(len);
            for i in lo..hi {
                out[(i - k) as usize] = seq[i as usize];
            }
            out
        })
        .collect()
}

/// Splices every time lane with [`splice`].
///
/// The time axis is replaced by two leading axes. For monthly lead-lag
/// composites (`delta == 12` and `window` a multiple of 12) they are
/// `year`, counted from the first year of the series, and `month`, the
/// offset `0..window` within the window. Otherwise they are `<time>_a` and
/// `<time>_b` with integer coordinates.
///
/// # Errors
///
/// Returns [`StatsError::InvalidWindow`] for a zero `delta` or `window`,
/// the soft [`StatsError::InsufficientData`] when the series is too short
/// for a single window, and the soft
/// [`nino_grid::GridError::UnresolvedAxis`] without a time axis.
#[tracing::instrument(level = "debug", skip(da), fields(var = da.name()))]
pub fn reshape_lead_lag(da: &LabeledArray, delta: usize, window: usize) -> Result<LabeledArray, StatsError> {
    reshape_splice(da, &AxisRef::Tag(AxisTag::Time), delta, window)
}

/// [`reshape_lead_lag`] along any axis.
///
/// # Errors
///
/// Same as [`reshape_lead_lag`].
pub fn reshape_splice(da: &LabeledArray, dim: &AxisRef, delta: usize, window: usize) -> Result<LabeledArray, StatsError> {
    if delta == 0 || window == 0 {
        return Err(StatsError::InvalidWindow {
            window,
            reason: format!("window and delta ({delta}) must be at least 1"),
        });
    }
    let name = require_axis(da, dim, OnMissing::Warn)?;
    let first = da.set_dim_as_first(&name)?;
    let len = first.shape()[0];
    let segments = segment_count(len, delta, window);
    if segments == 0 {
        return Err(StatsError::InsufficientData {
            needed: window / 2 + delta,
            got: len,
        });
    }
    let rest: Vec<usize> = first.shape()[1..].to_vec();
    let mut shape = vec![segments, window];
    shape.extend(&rest);
    let mut values = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
    let outer: usize = rest.iter().product();
    let mut table = values
        .view_mut()
        .into_shape_with_order(IxDyn(&[segments * window, outer]))
        .map_err(|_| GridError::ShapeMismatch {
            expected: vec![segments * window, outer],
            got: shape.clone(),
        })?;
    for (lane, mut dst) in first.values().lanes(Axis(0)).into_iter().zip(table.lanes_mut(Axis(0))) {
        let flat = splice(&lane.to_vec(), delta, window).into_iter().flatten();
        for (d, v) in dst.iter_mut().zip(flat) {
            *d = v;
        }
    }

    let is_time = resolve(da, AxisTag::Time).is_some_and(|t| t == name);
    let first_year = match first.time_bounds(&name) {
        Ok(Some((start, _))) if is_time => Some(start.year()),
        _ => None,
    };
    let (dims, coords) = match first_year {
        Some(year) if delta == 12 && window % 12 == 0 => {
            let years = (0..segments).map(|i| f64::from(year) + i as f64).collect();
            let months = (0..window).map(|i| i as f64).collect();
            (
                vec!["year".to_string(), "month".to_string()],
                vec![
                    ("year".to_string(), Coordinate::axis("year", years)),
                    ("month".to_string(), Coordinate::axis("month", months)),
                ],
            )
        }
        _ => {
            let a = format!("{name}_a");
            let b = format!("{name}_b");
            let coords = vec![
                (a.clone(), Coordinate::axis(a.clone(), (0..segments).map(|i| i as f64).collect())),
                (b.clone(), Coordinate::axis(b.clone(), (0..window).map(|i| i as f64).collect())),
            ];
            (vec![a, b], coords)
        }
    };
    debug!(segments, window, dims = ?dims, "spliced");
    Ok(first.replace_axis(&name, &dims, values, coords)?)
}
