//! Low-level NetCDF extraction helpers.

use std::collections::HashSet;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use netcdf::AttributeValue;
use nino_calendar::Calendar;
use nino_grid::{AttrValue, Attributes, Coordinate, Dataset, LabeledArray};
use tracing::{debug, warn};

use crate::error::IoError;
use crate::time::decode_offsets;

/// Attributes describing the on-disk encoding; consumed while decoding.
const ENCODING_ATTRS: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Converts a NetCDF attribute value; unsupported kinds yield `None`.
pub(crate) fn to_attr_value(value: AttributeValue) -> Option<AttrValue> {
    Some(match value {
        AttributeValue::Str(s) => AttrValue::Str(s),
        AttributeValue::Strs(s) => AttrValue::Str(s.join(" ")),
        AttributeValue::Double(v) => AttrValue::Float(v),
        AttributeValue::Float(v) => AttrValue::Float(f64::from(v)),
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Int(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Short(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Schar(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Uchar(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Doubles(v) => AttrValue::FloatList(v),
        AttributeValue::Floats(v) => AttrValue::FloatList(v.into_iter().map(f64::from).collect()),
        AttributeValue::Ints(v) => AttrValue::FloatList(v.into_iter().map(f64::from).collect()),
        AttributeValue::Shorts(v) => AttrValue::FloatList(v.into_iter().map(f64::from).collect()),
        _ => return None,
    })
}

fn read_attributes<'a>(attrs: impl Iterator<Item = netcdf::Attribute<'a>>) -> Attributes {
    let mut out = Attributes::new();
    for attr in attrs {
        match attr.value().ok().and_then(to_attr_value) {
            Some(value) => {
                out.insert(attr.name().to_string(), value);
            }
            None => debug!(attribute = attr.name(), "attribute skipped"),
        }
    }
    out
}

/// A variable as stored: axis names, decoded values and attributes.
#[derive(Debug)]
struct RawVariable {
    name: String,
    dims: Vec<String>,
    values: ArrayD<f64>,
    attrs: Attributes,
}

impl RawVariable {
    /// Reads `var`, masking `_FillValue`/`missing_value` to `NaN` and
    /// applying `scale_factor` and `add_offset`.
    fn read(var: &netcdf::Variable<'_>) -> Result<Self, IoError> {
        let name = var.name();
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();
        let mut attrs = read_attributes(var.attributes());
        let fills: Vec<f64> = ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|k| attrs.get(*k).and_then(AttrValue::as_f64))
            .collect();
        let scale = attrs.get("scale_factor").and_then(AttrValue::as_f64).unwrap_or(1.0);
        let offset = attrs.get("add_offset").and_then(AttrValue::as_f64).unwrap_or(0.0);
        for key in ENCODING_ATTRS {
            attrs.remove(key);
        }

        let raw = var.get_values::<f64, _>(..)?;
        let decoded: Vec<f64> = raw
            .into_iter()
            .map(|v| if fills.contains(&v) { f64::NAN } else { v * scale + offset })
            .collect();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), decoded).map_err(|e| IoError::Netcdf {
            reason: format!("variable '{name}' does not fill shape {shape:?}: {e}"),
        })?;
        Ok(Self {
            name,
            dims,
            values,
            attrs,
        })
    }

    fn string_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    /// Builds a coordinate; CF `"<unit> since <date>"` units make a time
    /// coordinate in the variable's `calendar` (default `standard`).
    fn into_coordinate(mut self) -> Result<Coordinate, IoError> {
        let units = self.string_attr("units").map(str::to_string);
        let Some(units) = units.filter(|u| u.contains(" since ")) else {
            return Ok(Coordinate::numeric(self.dims, self.values)?.with_attrs(self.attrs));
        };
        let [dim] = self.dims.as_slice() else {
            return Err(IoError::InvalidTime {
                reason: format!("time coordinate '{}' must span exactly one axis", self.name),
            });
        };
        let calendar: Calendar = match self.string_attr("calendar") {
            Some(name) => name.parse()?,
            None => Calendar::Standard,
        };
        let offsets: Vec<f64> = self.values.iter().copied().collect();
        let dates = decode_offsets(&offsets, &units, calendar)?;
        let dim = dim.clone();
        self.attrs.remove("units");
        self.attrs.remove("calendar");
        Ok(Coordinate::time(dim, dates, calendar).with_attrs(self.attrs))
    }
}

/// Reads a whole file into a [`Dataset`].
///
/// Coordinate variables (1-D and named after their dimension) and those
/// listed in a `coordinates` attribute become coordinates; variables named
/// by a `bounds` attribute are skipped. Each coordinate is attached to
/// every data variable spanning its axes.
///
/// With `requested` set, only those data variables are read and each must
/// exist. Otherwise every numeric variable is read and the others are
/// skipped with a warning.
pub(crate) fn read_dataset(path: &Path, requested: Option<&[String]>) -> Result<Dataset, IoError> {
    let file = open_file(path)?;

    let mut bounds: HashSet<String> = HashSet::new();
    let mut auxiliary: HashSet<String> = HashSet::new();
    for var in file.variables() {
        let attrs = read_attributes(var.attributes());
        if let Some(name) = attrs.get("bounds").and_then(AttrValue::as_str) {
            bounds.insert(name.to_string());
        }
        if let Some(names) = attrs.get("coordinates").and_then(AttrValue::as_str) {
            auxiliary.extend(names.split_whitespace().map(str::to_string));
        }
    }

    let mut coords: Vec<(String, Coordinate)> = Vec::new();
    let mut data: Vec<RawVariable> = Vec::new();
    for var in file.variables() {
        let name = var.name();
        if bounds.contains(&name) {
            debug!(variable = %name, "bounds variable skipped");
            continue;
        }
        let dims = var.dimensions();
        let is_axis = dims.len() == 1 && dims[0].name() == name;
        if is_axis || auxiliary.contains(&name) {
            match RawVariable::read(&var) {
                Ok(raw) => coords.push((name, raw.into_coordinate()?)),
                Err(e) => warn!(coordinate = %name, error = %e, "coordinate skipped"),
            }
            continue;
        }
        match requested {
            Some(names) if !names.contains(&name) => {}
            Some(_) => data.push(RawVariable::read(&var)?),
            None => match RawVariable::read(&var) {
                Ok(raw) => data.push(raw),
                Err(e) => warn!(variable = %name, error = %e, "variable skipped"),
            },
        }
    }

    if let Some(missing) = requested
        .into_iter()
        .flatten()
        .find(|n| !data.iter().any(|raw| &raw.name == *n))
    {
        return Err(IoError::MissingVariable {
            name: missing.clone(),
            path: path.to_path_buf(),
        });
    }

    let mut variables = Vec::with_capacity(data.len());
    for raw in data {
        let mut var = LabeledArray::new(raw.name, raw.dims, raw.values)?.with_attrs(raw.attrs);
        for (name, coord) in &coords {
            if coord.dims().iter().all(|d| var.has_axis(d)) {
                var = var.with_coord(name.clone(), coord.clone())?;
            }
        }
        variables.push(var);
    }
    debug!(variables = variables.len(), coordinates = coords.len(), "read file");
    Ok(Dataset::from_variables(variables)?.with_attrs(read_attributes(file.attributes())))
}
