//! Bounds selection along resolved axes.

use std::fmt;

use ndarray::{ArrayD, Axis, Zip};
use nino_calendar::TimeBound;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::array::LabeledArray;
use crate::axis::{AxisRef, AxisTag, OnMissing, check_axis, resolve};
use crate::dataset::Dataset;
use crate::error::GridError;

/// Lower and upper limit along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Date bounds for a time axis.
    Dates(TimeBound, TimeBound),
    /// Numeric bounds, in degrees for longitude and latitude.
    Degrees(f64, f64),
}

/// Ordered bounds per axis, e.g. `{T: ("1980-01-01", "2014-12-31"), X: (150, 270)}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    entries: Vec<(AxisRef, Bound)>,
}

/// Which end of a time selection to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the bound for `axis`.
    pub fn with(mut self, axis: impl Into<AxisRef>, bound: Bound) -> Self {
        let axis = axis.into();
        match self.entries.iter_mut().find(|(a, _)| *a == axis) {
            Some(slot) => slot.1 = bound,
            None => self.entries.push((axis, bound)),
        }
        self
    }

    /// Adds date bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Calendar`] if either string is not a date bound.
    pub fn with_dates(self, axis: impl Into<AxisRef>, lower: &str, upper: &str) -> Result<Self, GridError> {
        let bound = Bound::Dates(TimeBound::parse(lower)?, TimeBound::parse(upper)?);
        Ok(self.with(axis, bound))
    }

    /// Adds numeric bounds.
    pub fn with_degrees(self, axis: impl Into<AxisRef>, lower: f64, upper: f64) -> Self {
        self.with(axis, Bound::Degrees(lower, upper))
    }

    pub fn entries(&self) -> &[(AxisRef, Bound)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Dates(String, String),
    Degrees(f64, f64),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Bounds {
    /// Reads a table of `axis = [lower, upper]`; entries that are not a pair
    /// of strings or a pair of numbers are ignored.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoundsVisitor;

        impl<'de> Visitor<'de> for BoundsVisitor {
            type Value = Bounds;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of axis bounds")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Bounds, A::Error> {
                let mut bounds = Bounds::new();
                while let Some((key, raw)) = map.next_entry::<String, RawBound>()? {
                    let axis = AxisRef::parse(&key);
                    bounds = match raw {
                        RawBound::Dates(lo, hi) => bounds
                            .with_dates(axis, &lo, &hi)
                            .map_err(serde::de::Error::custom)?,
                        RawBound::Degrees(lo, hi) => bounds.with_degrees(axis, lo, hi),
                        RawBound::Other(_) => {
                            debug!(axis = %key, "ignoring malformed bound");
                            bounds
                        }
                    };
                }
                Ok(bounds)
            }
        }

        deserializer.deserialize_map(BoundsVisitor)
    }
}

/// Selects the sub-range given by `bounds` along each resolved axis.
///
/// Longitude is rolled first when the requested range leaves [0, 360).
/// On curvilinear grids the spatial bounds mask values to `NaN` instead of
/// slicing, and time is sliced on its own. Time selections are then checked
/// at both ends by [`check_time_bounds`]. Entries whose axis cannot be
/// resolved are skipped.
///
/// # Errors
///
/// Propagates array errors; never fails for an unresolved axis.
#[tracing::instrument(skip_all, fields(entries = bounds.entries().len()))]
pub fn select(ds: &Dataset, bounds: &Bounds) -> Result<Dataset, GridError> {
    let mut resolved: Vec<(String, Bound)> = Vec::new();
    for (axis, bound) in bounds.entries() {
        match check_axis(ds, axis, OnMissing::Warn)? {
            Some(name) => resolved.push((name, bound.clone())),
            None => debug!(%axis, "bound skipped, axis not found"),
        }
    }
    if resolved.is_empty() {
        return Ok(ds.clone());
    }
    let lookup = |name: &Option<String>| {
        name.as_ref()
            .and_then(|n| resolved.iter().find(|(r, _)| r == n))
            .map(|(_, b)| b.clone())
    };

    let mut out = ds.clone();
    let lon = resolve(ds, AxisTag::Longitude);
    if let Some(Bound::Degrees(a, b)) = lookup(&lon) {
        let (lo, hi) = (a.min(b), a.max(b));
        if lo < 0.0 || hi > 360.0 {
            let mut new_min = lo;
            if hi - lo < 360.0 {
                new_min -= 10f64.min(360.0 - (hi - lo) / 2.0);
            }
            debug!(new_min, "rolling longitude");
            out = roll_longitude(&out, Some(new_min))?;
        }
    }

    let time = resolve(&out, AxisTag::Time);
    let lat = resolve(&out, AxisTag::Latitude);
    if is_curvilinear(&out) {
        if let (Some(t), Some(bound @ Bound::Dates(..))) = (&time, lookup(&time)) {
            out = out.try_map(|v| select_axis(v, t, &bound))?;
        }
        out = mask_curvilinear(&out, lat.as_deref(), lookup(&lat), lon.as_deref(), lookup(&lon))?;
    } else {
        for (name, bound) in &resolved {
            out = out.try_map(|v| select_axis(v, name, bound))?;
        }
    }

    if let (Some(_), Some(Bound::Dates(lo, hi))) = (&time, lookup(&time)) {
        out = check_time_bounds(&out, &lo, BoundSide::Lower)?;
        out = check_time_bounds(&out, &hi, BoundSide::Upper)?;
    }
    Ok(out)
}

/// Slices one variable along `name`; variables without that axis are returned as is.
fn select_axis(var: &LabeledArray, name: &str, bound: &Bound) -> Result<LabeledArray, GridError> {
    if !var.has_axis(name) {
        return Ok(var.clone());
    }
    let indices: Vec<usize> = match bound {
        Bound::Dates(lo, hi) => {
            let Ok((dates, _)) = var.time_coord(name) else {
                debug!(axis = name, "date bounds on a non-time axis ignored");
                return Ok(var.clone());
            };
            dates
                .iter()
                .enumerate()
                .filter(|(_, d)| !lo.is_after(d) && !hi.is_before(d))
                .map(|(i, _)| i)
                .collect()
        }
        Bound::Degrees(lo, hi) => {
            let Some(values) = var.coord(name).and_then(|c| c.as_numeric()).filter(|a| a.ndim() == 1) else {
                debug!(axis = name, "numeric bounds on a non-numeric axis ignored");
                return Ok(var.clone());
            };
            values
                .iter()
                .enumerate()
                .filter(|&(_, v)| *lo <= *v && *v <= *hi)
                .map(|(i, _)| i)
                .collect()
        }
    };
    var.take(name, &indices)
}

/// `true` if latitude or longitude is carried by a coordinate of rank 2 or more.
pub fn is_curvilinear(ds: &Dataset) -> bool {
    [AxisTag::Latitude, AxisTag::Longitude].iter().any(|&tag| {
        resolve(ds, tag).is_some_and(|name| {
            ds.variables()
                .iter()
                .filter_map(|v| v.coord(&name))
                .any(|c| c.ndim() >= 2)
        })
    })
}

/// Masks values outside the spatial bounds of a curvilinear grid.
///
/// A single bound uses open intervals; latitude and longitude together use
/// closed intervals.
fn mask_curvilinear(
    ds: &Dataset,
    lat: Option<&str>,
    lat_bound: Option<Bound>,
    lon: Option<&str>,
    lon_bound: Option<Bound>,
) -> Result<Dataset, GridError> {
    let degrees = |b: Option<Bound>| match b {
        Some(Bound::Degrees(lo, hi)) => Some((lo, hi)),
        _ => None,
    };
    let (lat_b, lon_b) = (degrees(lat_bound), degrees(lon_bound));
    if lat_b.is_none() && lon_b.is_none() {
        return Ok(ds.clone());
    }
    ds.try_map(|var| {
        let lat_c = lat.and_then(|n| var.coord(n));
        let lon_c = lon.and_then(|n| var.coord(n));
        let (keep, dims) = match (lat_b, lat_c, lon_b, lon_c) {
            (Some((ylo, yhi)), Some(yc), Some((xlo, xhi)), Some(xc)) if yc.dims() == xc.dims() => {
                let (Some(y), Some(x)) = (yc.as_numeric(), xc.as_numeric()) else {
                    return Ok(var.clone());
                };
                let keep: ArrayD<bool> = Zip::from(y)
                    .and(x)
                    .map_collect(|&y, &x| ylo <= y && y <= yhi && xlo <= x && x <= xhi);
                (keep, yc.dims().to_vec())
            }
            (Some((lo, hi)), Some(c), None, _) | (None, _, Some((lo, hi)), Some(c)) => {
                let Some(v) = c.as_numeric() else {
                    return Ok(var.clone());
                };
                (v.mapv(|v| lo < v && v < hi), c.dims().to_vec())
            }
            _ => return Ok(var.clone()),
        };
        var.mask_where(&keep, &dims)
    })
}

/// Re-labels longitude and rolls it so the minimum comes first.
///
/// With `new_min`, longitudes are mapped into `[new_min, new_min + 360)`;
/// without it, into `[0, 360)`. On curvilinear grids the roll is along the
/// last axis of the longitude coordinate, using its mean over the first axis.
///
/// # Errors
///
/// Propagates array errors. A dataset without longitude is returned as is.
pub fn roll_longitude(ds: &Dataset, new_min: Option<f64>) -> Result<Dataset, GridError> {
    let Some(lon) = resolve(ds, AxisTag::Longitude) else {
        return Ok(ds.clone());
    };
    let base = new_min.unwrap_or(0.0);
    ds.try_map(|var| {
        let Some(coord) = var.coord(&lon) else {
            return Ok(var.clone());
        };
        let relabelled = coord.map_numeric(|v| base + (v - base).rem_euclid(360.0));
        let Some(values) = relabelled.as_numeric().cloned() else {
            return Ok(var.clone());
        };
        let roll_dim = relabelled.dims().last().cloned().unwrap_or_else(|| lon.clone());
        let var = var.clone().with_coord(lon.clone(), relabelled)?;
        let profile: Vec<f64> = if values.ndim() >= 2 {
            values
                .mean_axis(Axis(0))
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default()
        } else {
            values.iter().copied().collect()
        };
        let Some(argmin) = profile
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
        else {
            return Ok(var);
        };
        var.roll(&roll_dim, -(argmin as isize))
    })
}

/// Drops leading (or trailing) time steps that fall outside `bound`.
///
/// Repeats until the first (or last) date satisfies the bound or the time
/// axis is empty. The comparison uses only the fields written in the bound.
///
/// # Errors
///
/// Propagates array errors.
pub fn check_time_bounds(ds: &Dataset, bound: &TimeBound, side: BoundSide) -> Result<Dataset, GridError> {
    let Some(time) = resolve(ds, AxisTag::Time) else {
        return Ok(ds.clone());
    };
    let mut out = ds.clone();
    while let Some((first, last)) = out.time_bounds() {
        let outside = match side {
            BoundSide::Lower => bound.is_after(&first),
            BoundSide::Upper => bound.is_before(&last),
        };
        if !outside {
            break;
        }
        debug!(?side, %bound, "dropping time step outside bound");
        out = out.try_map(|v| match v.len_of(&time) {
            Some(n) if n > 0 => match side {
                BoundSide::Lower => v.slice_axis(&time, 1..n),
                BoundSide::Upper => v.slice_axis(&time, 0..n - 1),
            },
            _ => Ok(v.clone()),
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use ndarray::IxDyn;
    use nino_calendar::{Calendar, CalendarDate, monthly_sequence};

    use super::*;
    use crate::coord::Coordinate;

    fn field(lons: Vec<f64>) -> Dataset {
        let n = lons.len();
        let values = ArrayD::from_shape_fn(IxDyn(&[2, n]), |ix| ix[1] as f64);
        let var = LabeledArray::new("sst", ["lat", "lon"], values)
            .unwrap()
            .with_coord("lat", Coordinate::axis("lat", vec![-5.0, 5.0]))
            .unwrap()
            .with_coord("lon", Coordinate::axis("lon", lons))
            .unwrap();
        Dataset::from_variables([var]).unwrap()
    }

    fn lon_of(ds: &Dataset) -> Vec<f64> {
        ds.variables()[0]
            .coord("lon")
            .unwrap()
            .as_numeric()
            .unwrap()
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn degrees_inclusive() {
        let ds = field((0..36).map(|i| f64::from(i) * 10.0).collect());
        let out = select(&ds, &Bounds::new().with_degrees("X", 150.0, 270.0)).unwrap();
        assert_eq!(lon_of(&out), vec![150.0, 160.0, 170.0, 180.0, 190.0, 200.0, 210.0, 220.0, 230.0, 240.0, 250.0, 260.0, 270.0]);
    }

    #[test]
    fn negative_longitudes_roll() {
        let ds = field((0..36).map(|i| f64::from(i) * 10.0).collect());
        let out = select(&ds, &Bounds::new().with_degrees("X", -60.0, 30.0)).unwrap();
        assert_eq!(lon_of(&out), vec![-60.0, -50.0, -40.0, -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0]);
        // value at lon -60 came from 300
        assert_eq!(out.variables()[0].values()[[0, 0]], 30.0);
    }

    #[test]
    fn roll_longitude_default_wraps() {
        let ds = field(vec![-20.0, -10.0, 0.0, 10.0]);
        let out = roll_longitude(&ds, None).unwrap();
        assert_eq!(lon_of(&out), vec![0.0, 10.0, 340.0, 350.0]);
        assert_eq!(out.variables()[0].values()[[1, 0]], 2.0);
    }

    #[test]
    fn unresolved_axis_is_skipped() {
        let ds = field(vec![0.0, 10.0]);
        let out = select(&ds, &Bounds::new().with_dates("T", "1980", "1990").unwrap()).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn deserialize_ignores_malformed_entries() {
        let bounds: Bounds = toml::from_str(
            r#"
            T = ["1980-01-01", "2014-12-31"]
            X = [150, 270.5]
            Y = [1, 2, 3]
            lev = "surface"
            "#,
        )
        .unwrap();
        assert_eq!(bounds.entries().len(), 2);
        assert_eq!(bounds.entries()[1], (AxisRef::Tag(AxisTag::Longitude), Bound::Degrees(150.0, 270.5)));
    }

    #[test]
    fn check_time_bounds_drops_early_step() {
        let start = CalendarDate::new(Calendar::Standard, 1979, 12, 1).unwrap();
        let dates = monthly_sequence(Calendar::Standard, start, 5);
        let var = LabeledArray::series("sst", "time", vec![0.0; 5])
            .with_coord("time", Coordinate::time("time", dates, Calendar::Standard))
            .unwrap();
        let ds = Dataset::from_variables([var]).unwrap();
        let lower = TimeBound::parse("1980-01-01").unwrap();
        let out = check_time_bounds(&ds, &lower, BoundSide::Lower).unwrap();
        assert_eq!(out.time_bounds().unwrap().0.to_string(), "1980-01-01");
        let upper = TimeBound::parse("1980-02").unwrap();
        let out = check_time_bounds(&out, &upper, BoundSide::Upper).unwrap();
        assert_eq!(out.variables()[0].len_of("time"), Some(2));
    }

    #[test]
    fn check_time_bounds_can_empty_axis() {
        let start = CalendarDate::new(Calendar::Standard, 1979, 1, 1).unwrap();
        let var = LabeledArray::series("sst", "time", vec![0.0; 3])
            .with_coord(
                "time",
                Coordinate::time("time", monthly_sequence(Calendar::Standard, start, 3), Calendar::Standard),
            )
            .unwrap();
        let ds = Dataset::from_variables([var]).unwrap();
        let lower = TimeBound::parse("2000").unwrap();
        let out = check_time_bounds(&ds, &lower, BoundSide::Lower).unwrap();
        assert_eq!(out.variables()[0].len_of("time"), Some(0));
    }
}
