//! Coordinate-labeled N-dimensional arrays.

use std::ops::Range;

use ndarray::{Array2, ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use nino_calendar::{Calendar, CalendarDate};

use crate::attrs::{AttrValue, Attributes};
use crate::axis::AxisSource;
use crate::coord::Coordinate;
use crate::error::GridError;

/// A named N-dimensional `f64` buffer with axis names, coordinates and
/// attributes.
///
/// Every axis has a coordinate of the same name; [`LabeledArray::new`]
/// creates integer index coordinates which [`LabeledArray::with_coord`]
/// replaces. Auxiliary coordinates (such as 2-D latitude on a curvilinear
/// grid) span one or more axes under their own name. Missing values are
/// `NaN`. Every transformation returns a new array.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    name: String,
    dims: Vec<String>,
    values: ArrayD<f64>,
    coords: Vec<(String, Coordinate)>,
    attrs: Attributes,
}

impl LabeledArray {
    /// Creates an array with index coordinates `0..n` on every axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RankMismatch`] if `dims` does not match the rank
    /// of `values`, or [`GridError::DuplicateAxis`] for a repeated name.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
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
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(GridError::DuplicateAxis { name: d.clone() });
            }
        }
        let coords = dims
            .iter()
            .zip(values.shape())
            .map(|(d, &n)| (d.clone(), index_coord(d, n)))
            .collect();
        Ok(Self {
            name: name.into(),
            dims,
            values,
            coords,
            attrs: Attributes::new(),
        })
    }

    /// Creates a 1-D array along `dim`.
    pub fn series(name: impl Into<String>, dim: impl Into<String>, values: Vec<f64>) -> Self {
        let dim = dim.into();
        let n = values.len();
        Self {
            name: name.into(),
            coords: vec![(dim.clone(), index_coord(&dim, n))],
            dims: vec![dim],
            values: ndarray::Array1::from(values).into_dyn(),
            attrs: Attributes::new(),
        }
    }

    /// Adds or replaces the coordinate `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCoordinate`] if the coordinate spans an
    /// axis the array does not have, or its shape does not match.
    pub fn with_coord(mut self, name: impl Into<String>, coord: Coordinate) -> Result<Self, GridError> {
        let name = name.into();
        for (dim, &len) in coord.dims().iter().zip(&coord.shape()) {
            match self.len_of(dim) {
                None => {
                    return Err(GridError::InvalidCoordinate {
                        name,
                        reason: format!("spans unknown axis '{dim}'"),
                    });
                }
                Some(n) if n != len => {
                    return Err(GridError::InvalidCoordinate {
                        name,
                        reason: format!("length {len} along '{dim}', array has {n}"),
                    });
                }
                Some(_) => {}
            }
        }
        if self.dims.contains(&name) && coord.dims() != [name.clone()] {
            return Err(GridError::InvalidCoordinate {
                name,
                reason: "an axis coordinate must span only its own axis".to_string(),
            });
        }
        match self.coords.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = coord,
            None => self.coords.push((name, coord)),
        }
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces all attributes.
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Sets one attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Coordinates in insertion order.
    pub fn coords(&self) -> impl Iterator<Item = (&str, &Coordinate)> {
        self.coords.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn has_axis(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Length along `dim`, or `None` if the array has no such axis.
    pub fn len_of(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|i| self.values.shape()[i])
    }

    /// Position of `dim` among the axes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if the array has no such axis.
    pub fn axis_index(&self, dim: &str) -> Result<usize, GridError> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| GridError::MissingAxis {
                name: dim.to_string(),
                available: self.dims.join(", "),
            })
    }

    /// Dates and calendar of the time coordinate on `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotTimeAxis`] if `dim` has no date coordinate.
    pub fn time_coord(&self, dim: &str) -> Result<(&[CalendarDate], Calendar), GridError> {
        self.coord(dim)
            .and_then(Coordinate::as_time)
            .ok_or_else(|| GridError::NotTimeAxis {
                name: dim.to_string(),
            })
    }

    /// Same labels, new values.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the shape differs.
    pub fn with_values(&self, values: ArrayD<f64>) -> Result<Self, GridError> {
        if values.shape() != self.values.shape() {
            return Err(GridError::ShapeMismatch {
                expected: self.values.shape().to_vec(),
                got: values.shape().to_vec(),
            });
        }
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    /// Applies `f` elementwise.
    pub fn mapv(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.mapv(f),
            ..self.clone()
        }
    }

    /// Keeps `indices` along `dim`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn take(&self, dim: &str, indices: &[usize]) -> Result<Self, GridError> {
        let axis = self.axis_index(dim)?;
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values: self.values.select(Axis(axis), indices),
            coords: self
                .coords
                .iter()
                .map(|(n, c)| (n.clone(), c.take(dim, indices)))
                .collect(),
            attrs: self.attrs.clone(),
        })
    }

    /// Keeps the positions in `range` along `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn slice_axis(&self, dim: &str, range: Range<usize>) -> Result<Self, GridError> {
        let indices: Vec<usize> = range.collect();
        self.take(dim, &indices)
    }

    /// Appends `others` after `self` along `dim`.
    ///
    /// Each other array is transposed to this array's axis order first; its
    /// remaining axes must match in length. Coordinates spanning `dim` are
    /// joined, the others are taken from `self`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if an array lacks one of the axes,
    /// [`GridError::ShapeMismatch`] if other axes differ in length, or
    /// [`GridError::InvalidCoordinate`] if a coordinate along `dim` is
    /// missing or cannot be joined.
    pub fn concat(&self, others: &[LabeledArray], dim: &str) -> Result<Self, GridError> {
        let axis = self.axis_index(dim)?;
        let aligned = others
            .iter()
            .map(|o| o.transpose(&self.dims))
            .collect::<Result<Vec<_>, _>>()?;
        let mut views = vec![self.values.view()];
        for other in &aligned {
            let fits = other
                .shape()
                .iter()
                .zip(self.shape())
                .enumerate()
                .all(|(i, (a, b))| i == axis || a == b);
            if !fits {
                return Err(GridError::ShapeMismatch {
                    expected: self.shape().to_vec(),
                    got: other.shape().to_vec(),
                });
            }
            views.push(other.values.view());
        }
        let values = ndarray::concatenate(Axis(axis), &views).map_err(|_| GridError::ShapeMismatch {
            expected: self.shape().to_vec(),
            got: aligned.first().map(|o| o.shape().to_vec()).unwrap_or_default(),
        })?;
        let mut coords = Vec::with_capacity(self.coords.len());
        for (name, coord) in &self.coords {
            let parts = aligned
                .iter()
                .map(|o| {
                    o.coord(name).ok_or_else(|| GridError::InvalidCoordinate {
                        name: name.clone(),
                        reason: format!("missing from '{}' while joining along '{dim}'", o.name),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            coords.push((name.clone(), coord.concat(name, &parts, dim)?));
        }
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values,
            coords,
            attrs: self.attrs.clone(),
        })
    }

    /// Rotates values and coordinates along `dim` by `shift` positions, so
    /// that position `i` receives what was at `i - shift`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn roll(&self, dim: &str, shift: isize) -> Result<Self, GridError> {
        let n = self.len_of(dim).unwrap_or(0) as isize;
        if n == 0 {
            self.axis_index(dim)?;
            return Ok(self.clone());
        }
        let indices: Vec<usize> = (0..n)
            .map(|i| (i - shift).rem_euclid(n) as usize)
            .collect();
        self.take(dim, &indices)
    }

    /// Reorders axes to `order`, which must be a permutation of [`Self::dims`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] for an unknown name or
    /// [`GridError::RankMismatch`] if `order` is not a full permutation.
    pub fn transpose<S: AsRef<str>>(&self, order: &[S]) -> Result<Self, GridError> {
        if order.len() != self.dims.len() {
            return Err(GridError::RankMismatch {
                dims: order.len(),
                ndim: self.dims.len(),
            });
        }
        let perm = order
            .iter()
            .map(|d| self.axis_index(d.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, &p) in perm.iter().enumerate() {
            if perm[..i].contains(&p) {
                return Err(GridError::DuplicateAxis {
                    name: self.dims[p].clone(),
                });
            }
        }
        Ok(Self {
            name: self.name.clone(),
            dims: perm.iter().map(|&i| self.dims[i].clone()).collect(),
            values: self.values.view().permuted_axes(perm).to_owned(),
            coords: self.coords.clone(),
            attrs: self.attrs.clone(),
        })
    }

    /// Moves `dim` to the first position, keeping the other axes in order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn set_dim_as_first(&self, dim: &str) -> Result<Self, GridError> {
        let axis = self.axis_index(dim)?;
        if axis == 0 {
            return Ok(self.clone());
        }
        let mut order: Vec<&str> = vec![dim];
        order.extend(self.dims.iter().map(String::as_str).filter(|d| *d != dim));
        self.transpose(&order)
    }

    /// Renames an axis, its coordinate and every coordinate reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `old` is not an axis, or
    /// [`GridError::DuplicateAxis`] if `new` already exists.
    pub fn rename_axis(&self, old: &str, new: &str) -> Result<Self, GridError> {
        let axis = self.axis_index(old)?;
        if old == new {
            return Ok(self.clone());
        }
        if self.has_axis(new) || self.coord(new).is_some() {
            return Err(GridError::DuplicateAxis {
                name: new.to_string(),
            });
        }
        let mut out = self.clone();
        out.dims[axis] = new.to_string();
        for (name, coord) in &mut out.coords {
            if name == old {
                *name = new.to_string();
            }
            coord.rename_dim(old, new);
        }
        Ok(out)
    }

    /// Renames a coordinate that is not itself an axis.
    pub fn rename_coord(&self, old: &str, new: &str) -> Self {
        if self.has_axis(old) {
            return self.clone();
        }
        let mut out = self.clone();
        for (name, _) in &mut out.coords {
            if name == old {
                *name = new.to_string();
            }
        }
        out
    }

    /// Sorts along `dim` by its 1-D numeric coordinate, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis, or
    /// [`GridError::InvalidCoordinate`] if its coordinate is not numeric 1-D.
    pub fn sort_by_coord(&self, dim: &str) -> Result<Self, GridError> {
        self.axis_index(dim)?;
        let values = self
            .coord(dim)
            .and_then(Coordinate::as_numeric)
            .filter(|a| a.ndim() == 1)
            .ok_or_else(|| GridError::InvalidCoordinate {
                name: dim.to_string(),
                reason: "not a 1-D numeric coordinate".to_string(),
            })?;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[[a]].total_cmp(&values[[b]]));
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return Ok(self.clone());
        }
        self.take(dim, &order)
    }

    /// Values broadcast onto the axes `dims` with lengths `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Broadcast`] if this array has an axis that is not
    /// in `dims` or a length that does not fit.
    pub fn broadcast_to(&self, dims: &[String], shape: &[usize]) -> Result<ArrayD<f64>, GridError> {
        broadcast(&self.dims, self.values.view(), dims, shape)
    }

    /// Combines elementwise with `other`, broadcast onto this array's axes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Broadcast`] if `other` cannot be broadcast.
    pub fn zip_with(&self, other: &LabeledArray, f: impl Fn(f64, f64) -> f64) -> Result<Self, GridError> {
        let rhs = other.broadcast_to(&self.dims, self.values.shape())?;
        let values = Zip::from(&self.values)
            .and(&rhs)
            .map_collect(|&a, &b| f(a, b));
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    /// Sets values to `NaN` wherever `keep` (spanning `keep_dims`) is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Broadcast`] if `keep` cannot be broadcast.
    pub fn mask_where(&self, keep: &ArrayD<bool>, keep_dims: &[String]) -> Result<Self, GridError> {
        let keep = broadcast(keep_dims, keep.view(), &self.dims, self.values.shape())?;
        let values = Zip::from(&self.values)
            .and(&keep)
            .map_collect(|&v, &k| if k { v } else { f64::NAN });
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    /// Replaces every lane along `dim` by `f(lane)`.
    ///
    /// `f` must return a vector of the lane's length; shorter outputs leave
    /// the remaining positions unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn map_lanes(&self, dim: &str, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Result<Self, GridError> {
        let axis = self.axis_index(dim)?;
        let mut values = self.values.clone();
        for mut lane in values.lanes_mut(Axis(axis)) {
            let input = lane.to_vec();
            let output = f(&input);
            for (dst, v) in lane.iter_mut().zip(output) {
                *dst = v;
            }
        }
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    /// Maps every lane along `dim` to a lane of length `new_len`, returning
    /// the raw buffer (same axes, `dim` resized) for use with
    /// [`Self::replace_axis`].
    ///
    /// Positions `f` does not fill are `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis.
    pub fn apply_along(
        &self,
        dim: &str,
        new_len: usize,
        mut f: impl FnMut(&[f64]) -> Vec<f64>,
    ) -> Result<ArrayD<f64>, GridError> {
        let axis = self.axis_index(dim)?;
        let mut shape = self.values.shape().to_vec();
        shape[axis] = new_len;
        let mut out = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
        Zip::from(self.values.lanes(Axis(axis)))
            .and(out.lanes_mut(Axis(axis)))
            .for_each(|src, mut dst| {
                let input = src.to_vec();
                for (d, v) in dst.iter_mut().zip(f(&input)) {
                    *d = v;
                }
            });
        Ok(out)
    }

    /// Flattens to a `(kept, reduced)` table.
    ///
    /// Rows enumerate the kept axes (in array order), columns the axes in
    /// `reduce` (in the given order). Returns the table and the kept axis
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if a name in `reduce` is not an axis.
    pub fn split_axes<S: AsRef<str>>(&self, reduce: &[S]) -> Result<(Array2<f64>, Vec<String>), GridError> {
        let reduce_idx = reduce
            .iter()
            .map(|d| self.axis_index(d.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, &r) in reduce_idx.iter().enumerate() {
            if reduce_idx[..i].contains(&r) {
                return Err(GridError::DuplicateAxis {
                    name: self.dims[r].clone(),
                });
            }
        }
        let kept_idx: Vec<usize> = (0..self.dims.len())
            .filter(|i| !reduce_idx.contains(i))
            .collect();
        let shape = self.values.shape();
        let outer: usize = kept_idx.iter().map(|&i| shape[i]).product();
        let inner: usize = reduce_idx.iter().map(|&i| shape[i]).product();
        let perm: Vec<usize> = kept_idx.iter().chain(&reduce_idx).copied().collect();
        let flat: Vec<f64> = self.values.view().permuted_axes(perm).iter().copied().collect();
        let got = flat.len();
        let table = Array2::from_shape_vec((outer, inner), flat).map_err(|_| GridError::ShapeMismatch {
            expected: vec![outer, inner],
            got: vec![got],
        })?;
        let kept = kept_idx.iter().map(|&i| self.dims[i].clone()).collect();
        Ok((table, kept))
    }

    /// Builds the result of reducing over `removed`: one value per row of
    /// [`Self::split_axes`], with coordinates spanning a removed axis dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if `values` does not have one
    /// entry per combination of kept axes.
    pub fn reduced<S: AsRef<str>>(&self, removed: &[S], values: Vec<f64>) -> Result<Self, GridError> {
        let removed: Vec<&str> = removed.iter().map(AsRef::as_ref).collect();
        let (dims, shape): (Vec<String>, Vec<usize>) = self
            .dims
            .iter()
            .zip(self.values.shape())
            .filter(|(d, _)| !removed.contains(&d.as_str()))
            .map(|(d, &n)| (d.clone(), n))
            .unzip();
        let got = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| GridError::ShapeMismatch {
            expected: shape.clone(),
            got: vec![got],
        })?;
        let coords = self
            .coords
            .iter()
            .filter(|(_, c)| c.dims().iter().all(|d| !removed.contains(&d.as_str())))
            .cloned()
            .collect();
        Ok(Self {
            name: self.name.clone(),
            dims,
            values,
            coords,
            attrs: self.attrs.clone(),
        })
    }

    /// Replaces the axis `dim` by `new_dims` at the same position.
    ///
    /// `values` must have the resulting shape. Coordinates spanning `dim`
    /// are dropped; `new_coords` are added (index coordinates are created
    /// for new axes without one).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAxis`] if `dim` is not an axis,
    /// [`GridError::RankMismatch`] or [`GridError::ShapeMismatch`] if
    /// `values` does not fit, or [`GridError::InvalidCoordinate`] for a
    /// coordinate that does not fit.
    pub fn replace_axis(
        &self,
        dim: &str,
        new_dims: &[String],
        values: ArrayD<f64>,
        new_coords: Vec<(String, Coordinate)>,
    ) -> Result<Self, GridError> {
        let axis = self.axis_index(dim)?;
        let mut dims: Vec<String> = self.dims[..axis].to_vec();
        dims.extend(new_dims.iter().cloned());
        dims.extend(self.dims[axis + 1..].iter().cloned());
        if dims.len() != values.ndim() {
            return Err(GridError::RankMismatch {
                dims: dims.len(),
                ndim: values.ndim(),
            });
        }
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(GridError::DuplicateAxis { name: d.clone() });
            }
            if d != dim && self.has_axis(d) && values.shape()[i] != self.values.shape()[self.axis_index(d)?] {
                return Err(GridError::ShapeMismatch {
                    expected: vec![self.values.shape()[self.axis_index(d)?]],
                    got: vec![values.shape()[i]],
                });
            }
        }
        let mut out = Self {
            name: self.name.clone(),
            coords: Vec::new(),
            attrs: self.attrs.clone(),
            dims,
            values,
        };
        for (name, coord) in &self.coords {
            if !coord.dims().iter().any(|d| d == dim) {
                out.coords.push((name.clone(), coord.clone()));
            }
        }
        for (name, coord) in new_coords {
            out = out.with_coord(name, coord)?;
        }
        for (i, d) in out.dims.clone().iter().enumerate() {
            if out.coord(d).is_none() {
                let n = out.values.shape()[i];
                out.coords.push((d.clone(), index_coord(d, n)));
            }
        }
        Ok(out)
    }

    /// Drops coordinates spanning axes the array no longer has.
    pub fn remove_unused_coordinates(&self) -> Self {
        Self {
            coords: self
                .coords
                .iter()
                .filter(|(_, c)| c.dims().iter().all(|d| self.has_axis(d)))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// First and last date along `dim`, or `None` if it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotTimeAxis`] if `dim` has no date coordinate.
    pub fn time_bounds(&self, dim: &str) -> Result<Option<(CalendarDate, CalendarDate)>, GridError> {
        let (dates, _) = self.time_coord(dim)?;
        Ok(dates.first().zip(dates.last()).map(|(a, b)| (*a, *b)))
    }
}

impl AxisSource for LabeledArray {
    fn axis_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.coords.iter().map(|(n, _)| n.clone()).collect();
        for d in &self.dims {
            if !names.contains(d) {
                names.push(d.clone());
            }
        }
        names
    }
}

fn index_coord(dim: &str, n: usize) -> Coordinate {
    Coordinate::axis(dim, (0..n).map(|i| i as f64).collect())
}

/// Broadcasts `view` (spanning `from`) onto axes `to` with lengths `shape`.
pub(crate) fn broadcast<T: Clone>(
    from: &[String],
    view: ArrayViewD<'_, T>,
    to: &[String],
    shape: &[usize],
) -> Result<ArrayD<T>, GridError> {
    let err = || GridError::Broadcast {
        from: from.to_vec(),
        to: to.to_vec(),
    };
    let perm: Vec<usize> = to
        .iter()
        .filter_map(|d| from.iter().position(|f| f == d))
        .collect();
    if perm.len() != from.len() || view.ndim() != from.len() {
        return Err(err());
    }
    let mut aligned = view.permuted_axes(perm);
    for (i, d) in to.iter().enumerate() {
        if !from.contains(d) {
            aligned = aligned.insert_axis(Axis(i));
        }
    }
    aligned.broadcast(IxDyn(shape)).map(|b| b.to_owned()).ok_or_else(err)
}
