//! Per-gridpoint linear regression with significance testing.

use std::fmt;
use std::str::FromStr;

use nino_grid::{AxisRef, Dataset, GridError, LabeledArray, OnMissing, align, require_axis};
use serde::Deserialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::error::StatsError;
use crate::series::{count_valid, nan_mean, nan_std};

/// Alternative hypothesis about the regression slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Alternative {
    /// The slope is greater than zero.
    Greater,
    /// The slope is less than zero.
    Less,
    /// The slope is nonzero.
    #[default]
    TwoSided,
}

impl Alternative {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greater => "greater",
            Self::Less => "less",
            Self::TwoSided => "two-sided",
        }
    }

    fn p_value(self, dist: &StudentsT, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let sf = |v: f64| {
            if v.is_infinite() {
                if v > 0.0 { 0.0 } else { 1.0 }
            } else {
                dist.sf(v)
            }
        };
        match self {
            Self::Greater => sf(t),
            Self::Less => 1.0 - sf(t),
            Self::TwoSided => 2.0 * sf(t.abs()),
        }
    }
}

impl FromStr for Alternative {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater" => Ok(Self::Greater),
            "less" => Ok(Self::Less),
            "two-sided" => Ok(Self::TwoSided),
            other => Err(StatsError::InvalidAlternative {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Alternative {
    type Error = StatsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`linear_regression`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegressionOptions {
    pub alternative: Alternative,
    /// Steps `x` is shifted back along the regression axis.
    pub lag_x: i64,
    /// Steps `y` is shifted back along the regression axis.
    pub lag_y: i64,
    /// Severity of a literal regression axis missing from either input.
    pub on_missing: OnMissing,
}

impl RegressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    pub fn with_lag_x(mut self, lag: i64) -> Self {
        self.lag_x = lag;
        self
    }

    pub fn with_lag_y(mut self, lag: i64) -> Self {
        self.lag_y = lag;
        self
    }

    pub fn with_on_missing(mut self, on_missing: OnMissing) -> Self {
        self.on_missing = on_missing;
        self
    }
}

/// Result of [`linear_regression`]: five arrays shaped like the inputs
/// without the regression axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    pub slope: LabeledArray,
    pub intercept: LabeledArray,
    /// Pearson correlation coefficient.
    pub rvalue: LabeledArray,
    pub pvalue: LabeledArray,
    pub stderr: LabeledArray,
}

impl RegressionResult {
    /// Variable names, in dataset order.
    pub const VARIABLES: [&'static str; 5] = ["slope", "intercept", "rvalue", "pvalue", "stderr"];

    /// The five arrays as a dataset named by [`Self::VARIABLES`].
    pub fn into_dataset(self) -> Dataset {
        [self.slope, self.intercept, self.rvalue, self.pvalue, self.stderr]
            .into_iter()
            .fold(Dataset::new(), Dataset::with_replaced)
    }
}

/// Regresses `y` on `x` along `dim`, at every point of the other axes.
///
/// `x` and `y` are first shifted back by their lags (dropping the steps
/// left without data), then inner-joined on the coordinate of `dim`. The
/// array with fewer axes is broadcast onto the other; coordinates of the
/// result come from `y` whenever `y` spans every axis of `x`.
///
/// With `n` the count of present `y` values and population standard
/// deviations: `cov = sum((x - x̄)(y - ȳ)) / n`, `r = cov / (σx σy)`,
/// `slope = cov / σx²`, `intercept = ȳ - x̄ slope`,
/// `t = r √(n - 2) / √(1 - r²)`, `stderr = slope / t`, and the p-value of
/// `t` under a Student-t distribution with `n - 2` degrees of freedom.
///
/// # Errors
///
/// Returns the soft [`GridError::UnresolvedAxis`] if `dim` cannot be
/// resolved in either array, [`GridError::MissingAxis`] instead for a
/// literal `dim` under [`OnMissing::Fail`], the soft [`GridError::EmptyAlignment`] or
/// [`StatsError::InsufficientData`] when nothing is left to regress, and
/// [`GridError::Broadcast`] when neither array spans the other's axes.
#[tracing::instrument(level = "debug", skip(x, y, options), fields(x = x.name(), y = y.name(), dim = %dim))]
pub fn linear_regression(
    x: &LabeledArray,
    y: &LabeledArray,
    dim: &AxisRef,
    options: &RegressionOptions,
) -> Result<RegressionResult, StatsError> {
    let dim_x = require_axis(x, dim, options.on_missing)?;
    let dim_y = require_axis(y, dim, options.on_missing)?;
    let x = lagged(x, &dim_x, options.lag_x)?;
    let mut y = lagged(y, &dim_y, options.lag_y)?;
    if dim_y != dim_x {
        y = y.rename_axis(&dim_y, &dim_x)?;
    }
    let (x, y) = align(&x, &y, &dim_x)?;
    let dim = dim_x;

    let spans = |a: &LabeledArray, b: &LabeledArray| a.dims().iter().all(|d| b.has_axis(d));
    let base = if spans(&x, &y) {
        y.clone()
    } else if spans(&y, &x) {
        x.clone()
    } else {
        return Err(GridError::Broadcast {
            from: x.dims().to_vec(),
            to: y.dims().to_vec(),
        }
        .into());
    };
    let x_full = base.with_values(x.broadcast_to(base.dims(), base.shape())?)?;
    let y_full = base.with_values(y.broadcast_to(base.dims(), base.shape())?)?;
    let (xt, _) = x_full.split_axes(&[dim.as_str()])?;
    let (yt, _) = y_full.split_axes(&[dim.as_str()])?;

    let mut columns: [Vec<f64>; 5] = Default::default();
    for (xr, yr) in xt.rows().into_iter().zip(yt.rows()) {
        let fit = LaneFit::compute(&xr.to_vec(), &yr.to_vec());
        let p = if fit.dof > 0.0 {
            let dist = StudentsT::new(0.0, 1.0, fit.dof).map_err(|e| StatsError::Distribution {
                reason: e.to_string(),
            })?;
            options.alternative.p_value(&dist, fit.t)
        } else {
            f64::NAN
        };
        for (col, v) in columns.iter_mut().zip([fit.slope, fit.intercept, fit.r, p, fit.stderr]) {
            col.push(v);
        }
    }
    debug!(points = columns[0].len(), alternative = %options.alternative, "regression computed");

    let [slope, intercept, rvalue, pvalue, stderr] = columns;
    let variable = |name: &str, values: Vec<f64>| -> Result<LabeledArray, StatsError> {
        Ok(base
            .reduced(&[dim.as_str()], values)?
            .with_name(name)
            .with_attrs(Default::default()))
    };
    Ok(RegressionResult {
        slope: variable("slope", slope)?,
        intercept: variable("intercept", intercept)?,
        rvalue: variable("rvalue", rvalue)?,
        pvalue: variable("pvalue", pvalue)?,
        stderr: variable("stderr", stderr)?,
    })
}

/// Shifts `da` back by `lag` steps along `dim` and drops the steps left
/// without data.
fn lagged(da: &LabeledArray, dim: &str, lag: i64) -> Result<LabeledArray, StatsError> {
    if lag == 0 {
        return Ok(da.clone());
    }
    let n = da.shape()[da.axis_index(dim)?];
    let m = lag.unsigned_abs() as usize;
    if m >= n {
        return Err(StatsError::InsufficientData { needed: m + 1, got: n });
    }
    let (labels, data) = if lag > 0 { (0..n - m, m..n) } else { (m..n, 0..n - m) };
    let values = da.slice_axis(dim, data)?.values().clone();
    Ok(da.slice_axis(dim, labels)?.with_values(values)?)
}

struct LaneFit {
    slope: f64,
    intercept: f64,
    r: f64,
    t: f64,
    stderr: f64,
    dof: f64,
}

impl LaneFit {
    fn compute(x: &[f64], y: &[f64]) -> Self {
        let n = count_valid(y) as f64;
        let (xm, ym) = (nan_mean(x), nan_mean(y));
        let (xs, ys) = (nan_std(x, 0), nan_std(y, 0));
        let cov = x
            .iter()
            .zip(y)
            .map(|(&a, &b)| (a - xm) * (b - ym))
            .filter(|v| !v.is_nan())
            .sum::<f64>()
            / n;
        let r = (cov / (xs * ys)).clamp(-1.0, 1.0);
        let slope = cov / (xs * xs);
        let intercept = ym - xm * slope;
        let t = r * (n - 2.0).sqrt() / (1.0 - r * r).sqrt();
        Self {
            slope,
            intercept,
            r,
            t,
            stderr: slope / t,
            dof: n - 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{ArrayD, IxDyn};
    use nino_grid::Coordinate;

    use super::*;

    fn series(name: &str, values: Vec<f64>) -> LabeledArray {
        let n = values.len();
        LabeledArray::series(name, "time", values)
            .with_coord("time", Coordinate::axis("time", (0..n).map(|i| i as f64).collect()))
            .unwrap()
    }

    #[test]
    fn alternative_parsing() {
        assert_eq!("two-sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!(Alternative::default(), Alternative::TwoSided);
        let err = "both".parse::<Alternative>().unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn known_line() {
        let x: Vec<f64> = (0..12).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0 + if *v as i64 % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let out = linear_regression(&series("x", x), &series("y", y), &"T".into(), &RegressionOptions::new()).unwrap();
        assert_abs_diff_eq!(out.slope.values()[IxDyn(&[])], 3.0, epsilon = 0.05);
        assert!(out.pvalue.values()[IxDyn(&[])] < 1e-6);
        assert_eq!(out.into_dataset().names().collect::<Vec<_>>(), RegressionResult::VARIABLES);
    }

    #[test]
    fn p_value_tails() {
        let dist = StudentsT::new(0.0, 1.0, 10.0).unwrap();
        let greater = Alternative::Greater.p_value(&dist, 2.0);
        let less = Alternative::Less.p_value(&dist, 2.0);
        let two = Alternative::TwoSided.p_value(&dist, 2.0);
        assert_abs_diff_eq!(greater + less, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(two, 2.0 * greater, epsilon = 1e-12);
        assert_eq!(Alternative::Greater.p_value(&dist, f64::INFINITY), 0.0);
    }

    #[test]
    fn field_on_index() {
        let x: Vec<f64> = (0..10).map(|i| f64::from(i).sin()).collect();
        let values = ArrayD::from_shape_fn(IxDyn(&[10, 2]), |ix| x[ix[0]] * if ix[1] == 0 { 2.0 } else { -1.0 } + 4.0);
        let y = LabeledArray::new("ts", ["time", "lat"], values)
            .unwrap()
            .with_coord("time", Coordinate::axis("time", (0..10).map(f64::from).collect()))
            .unwrap()
            .with_coord("lat", Coordinate::axis("lat", vec![-5.0, 5.0]))
            .unwrap();
        let out = linear_regression(&series("nino", x), &y, &"T".into(), &RegressionOptions::new()).unwrap();
        assert_eq!(out.slope.dims(), ["lat"]);
        assert_abs_diff_eq!(out.slope.values()[[0]], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.slope.values()[[1]], -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.intercept.values()[[1]], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.rvalue.values()[[1]], -1.0, epsilon = 1e-9);
        assert!(out.slope.coord("lat").is_some());
    }

    #[test]
    fn lag_pairs_later_x_with_y() {
        // y(t) = x(t + 2)
        let x: Vec<f64> = (0..20).map(|i| (f64::from(i) * 0.7).cos()).collect();
        let y: Vec<f64> = (0..20).map(|i| if i + 2 < 20 { x[i + 2] } else { 0.0 }).collect();
        let y = series("y", y).slice_axis("time", 0..18).unwrap();
        let options = RegressionOptions::new().with_lag_x(2);
        let out = linear_regression(&series("x", x), &y, &"T".into(), &options).unwrap();
        assert_abs_diff_eq!(out.rvalue.values()[IxDyn(&[])], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn unresolved_axis_is_soft() {
        let x = LabeledArray::series("x", "step", vec![1.0, 2.0, 3.0]);
        let err = linear_regression(&x, &x, &"T".into(), &RegressionOptions::new()).unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn missing_literal_axis_follows_severity() {
        let x = LabeledArray::series("x", "step", vec![1.0, 2.0, 3.0]);
        let lev: AxisRef = "lev".into();
        let warn = linear_regression(&x, &x, &lev, &RegressionOptions::new()).unwrap_err();
        assert!(warn.is_soft());
        let options = RegressionOptions::new().with_on_missing(OnMissing::Fail);
        let fail = linear_regression(&x, &x, &lev, &options).unwrap_err();
        assert!(!fail.is_soft());
        assert!(matches!(fail, StatsError::Grid(GridError::MissingAxis { .. })));
    }
}
