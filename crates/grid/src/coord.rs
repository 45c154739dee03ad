//! Coordinate values labelling one or more array axes.

use std::collections::HashMap;

use ndarray::{Array1, ArrayD, Axis};
use nino_calendar::{Calendar, CalendarDate};

use crate::attrs::Attributes;
use crate::error::GridError;

/// Values of a coordinate: plain numbers, or dates in a calendar.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValues {
    /// Numeric labels of any rank (2-D for curvilinear latitude/longitude).
    Numeric(ArrayD<f64>),
    /// One date per step of a single axis.
    Time {
        dates: Vec<CalendarDate>,
        calendar: Calendar,
    },
}

/// Hashable label of one position along a 1-D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Label {
    Date(CalendarDate),
    Number(u64),
}

/// A coordinate: the axes it spans, its values and its own metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    dims: Vec<String>,
    values: CoordValues,
    attrs: Attributes,
}

impl Coordinate {
    /// Creates a numeric coordinate spanning `dims`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RankMismatch`] if `dims` does not match the rank
    /// of `values`.
    pub fn numeric<S: Into<String>>(
        dims: impl IntoIterator<Item = S>,
        values: ArrayD<f64>,
    ) -> Result<Self, GridError> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != values.ndim() {
            return Err(GridError::RankMismatch {
                dims: dims.len(),
                ndim: values.ndim(),
            });
        }
        Ok(Self {
            dims,
            values: CoordValues::Numeric(values),
            attrs: Attributes::new(),
        })
    }

    /// Creates a 1-D numeric coordinate along `dim`.
    pub fn axis(dim: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            dims: vec![dim.into()],
            values: CoordValues::Numeric(Array1::from(values).into_dyn()),
            attrs: Attributes::new(),
        }
    }

    /// Creates a time coordinate along `dim`.
    pub fn time(dim: impl Into<String>, dates: Vec<CalendarDate>, calendar: Calendar) -> Self {
        Self {
            dims: vec![dim.into()],
            values: CoordValues::Time { dates, calendar },
            attrs: Attributes::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        match &self.values {
            CoordValues::Numeric(a) => a.shape().to_vec(),
            CoordValues::Time { dates, .. } => vec![dates.len()],
        }
    }

    pub fn values(&self) -> &CoordValues {
        &self.values
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Numeric values, or `None` for a time coordinate.
    pub fn as_numeric(&self) -> Option<&ArrayD<f64>> {
        match &self.values {
            CoordValues::Numeric(a) => Some(a),
            CoordValues::Time { .. } => None,
        }
    }

    /// Dates and calendar, or `None` for a numeric coordinate.
    pub fn as_time(&self) -> Option<(&[CalendarDate], Calendar)> {
        match &self.values {
            CoordValues::Time { dates, calendar } => Some((dates, *calendar)),
            CoordValues::Numeric(_) => None,
        }
    }

    /// Values as `f64`; dates become days since 0000-01-01.
    pub fn to_f64(&self) -> ArrayD<f64> {
        match &self.values {
            CoordValues::Numeric(a) => a.clone(),
            CoordValues::Time { dates, calendar } => {
                let days: Vec<f64> = dates.iter().map(|d| d.ordinal_days(*calendar)).collect();
                Array1::from(days).into_dyn()
            }
        }
    }

    /// Applies `f` to every numeric value; time coordinates are returned unchanged.
    pub fn map_numeric(&self, f: impl Fn(f64) -> f64) -> Self {
        let values = match &self.values {
            CoordValues::Numeric(a) => CoordValues::Numeric(a.mapv(f)),
            time => time.clone(),
        };
        Self {
            dims: self.dims.clone(),
            values,
            attrs: self.attrs.clone(),
        }
    }

    /// Keeps `indices` along `dim`; coordinates not spanning `dim` are cloned.
    pub(crate) fn take(&self, dim: &str, indices: &[usize]) -> Self {
        let Some(axis) = self.dims.iter().position(|d| d == dim) else {
            return self.clone();
        };
        let values = match &self.values {
            CoordValues::Numeric(a) => CoordValues::Numeric(a.select(Axis(axis), indices)),
            CoordValues::Time { dates, calendar } => CoordValues::Time {
                dates: indices.iter().map(|&i| dates[i]).collect(),
                calendar: *calendar,
            },
        };
        Self {
            dims: self.dims.clone(),
            values,
            attrs: self.attrs.clone(),
        }
    }

    /// Joins `others` after `self` along `dim`.
    ///
    /// Coordinates not spanning `dim` are returned unchanged.
    pub(crate) fn concat(&self, name: &str, others: &[&Coordinate], dim: &str) -> Result<Self, GridError> {
        let Some(axis) = self.dims.iter().position(|d| d == dim) else {
            return Ok(self.clone());
        };
        let invalid = |reason: String| GridError::InvalidCoordinate {
            name: name.to_string(),
            reason,
        };
        let values = match &self.values {
            CoordValues::Numeric(first) => {
                let mut views = vec![first.view()];
                for other in others {
                    let a = other
                        .as_numeric()
                        .ok_or_else(|| invalid("cannot join numeric and time labels".to_string()))?;
                    views.push(a.view());
                }
                let joined = ndarray::concatenate(Axis(axis), &views)
                    .map_err(|e| invalid(format!("cannot join along '{dim}': {e}")))?;
                CoordValues::Numeric(joined)
            }
            CoordValues::Time { dates, calendar } => {
                let mut joined = dates.clone();
                for other in others {
                    match other.as_time() {
                        Some((more, cal)) if cal == *calendar => joined.extend_from_slice(more),
                        Some((_, cal)) => return Err(invalid(format!("calendars differ: {calendar} and {cal}"))),
                        None => return Err(invalid("cannot join time and numeric labels".to_string())),
                    }
                }
                CoordValues::Time {
                    dates: joined,
                    calendar: *calendar,
                }
            }
        };
        Ok(Self {
            dims: self.dims.clone(),
            values,
            attrs: self.attrs.clone(),
        })
    }

    pub(crate) fn rename_dim(&mut self, old: &str, new: &str) {
        for d in &mut self.dims {
            if d == old {
                *d = new.to_string();
            }
        }
    }

    /// Hashable labels of a 1-D coordinate, or `None` for higher ranks.
    pub(crate) fn labels(&self) -> Option<Vec<Label>> {
        if self.ndim() != 1 {
            return None;
        }
        Some(match &self.values {
            CoordValues::Numeric(a) => a.iter().map(|v| Label::Number(v.to_bits())).collect(),
            CoordValues::Time { dates, .. } => dates.iter().map(|d| Label::Date(*d)).collect(),
        })
    }
}

/// First position of each label.
pub(crate) fn label_positions(labels: &[Label]) -> HashMap<Label, usize> {
    let mut positions = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        positions.entry(*label).or_insert(i);
    }
    positions
}

#[cfg(test)]
mod tests {
    use ndarray::IxDyn;

    use super::*;

    fn months(n: usize) -> Vec<CalendarDate> {
        let start = CalendarDate::new(Calendar::NoLeap, 2000, 1, 1).unwrap();
        nino_calendar::monthly_sequence(Calendar::NoLeap, start, n)
    }

    #[test]
    fn numeric_rank_checked() {
        let values = ArrayD::zeros(IxDyn(&[2, 3]));
        assert!(Coordinate::numeric(["j"], values.clone()).is_err());
        assert_eq!(Coordinate::numeric(["j", "i"], values).unwrap().shape(), vec![2, 3]);
    }

    #[test]
    fn take_time() {
        let coord = Coordinate::time("time", months(4), Calendar::NoLeap);
        let taken = coord.take("time", &[1, 3]);
        let (dates, _) = taken.as_time().unwrap();
        assert_eq!(dates[0].month(), 2);
        assert_eq!(dates[1].month(), 4);
    }

    #[test]
    fn concat_time_checks_calendar() {
        let a = Coordinate::time("time", months(2), Calendar::NoLeap);
        let b = a.take("time", &[1]);
        let joined = a.concat("time", &[&b], "time").unwrap();
        assert_eq!(joined.shape(), vec![3]);
        let other = Coordinate::time("time", months(1), Calendar::Day360);
        assert!(a.concat("time", &[&other], "time").is_err());
        assert!(a.concat("time", &[&Coordinate::axis("time", vec![0.0])], "time").is_err());
    }

    #[test]
    fn take_other_dim_is_identity() {
        let coord = Coordinate::axis("lat", vec![-5.0, 0.0, 5.0]);
        assert_eq!(coord.take("lon", &[0]), coord);
    }

    #[test]
    fn time_to_f64_is_daily_spaced() {
        let coord = Coordinate::time("time", months(2), Calendar::NoLeap);
        let v = coord.to_f64();
        assert_eq!(v[[1]] - v[[0]], 31.0);
    }

    #[test]
    fn map_numeric_wraps() {
        let coord = Coordinate::axis("lon", vec![-10.0, 350.0]);
        let wrapped = coord.map_numeric(|v| v.rem_euclid(360.0));
        assert_eq!(wrapped.as_numeric().unwrap().as_slice().unwrap(), &[350.0, 350.0]);
    }

    #[test]
    fn labels_only_for_1d() {
        let values = ArrayD::zeros(IxDyn(&[2, 2]));
        assert!(Coordinate::numeric(["j", "i"], values).unwrap().labels().is_none());
        let labels = Coordinate::axis("x", vec![1.0, 2.0]).labels().unwrap();
        assert_eq!(label_positions(&labels)[&Label::Number(2.0f64.to_bits())], 1);
    }
}
