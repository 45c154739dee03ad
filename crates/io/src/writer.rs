//! Writing datasets to NetCDF.

use std::collections::HashSet;
use std::path::Path;

use netcdf::AttributeValue;
use nino_grid::{AttrValue, Attributes, CoordValues, Coordinate, Dataset};
use tracing::{debug, info};

use crate::error::IoError;
use crate::time::encode_dates;

fn to_netcdf(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Str(s) => AttributeValue::Str(s.clone()),
        AttrValue::Int(i) => AttributeValue::Longlong(*i),
        AttrValue::Float(f) => AttributeValue::Double(*f),
        AttrValue::FloatList(v) => AttributeValue::Doubles(v.clone()),
    }
}

fn put_attributes(var: &mut netcdf::VariableMut<'_>, attrs: &Attributes) -> Result<(), IoError> {
    for (key, value) in attrs {
        var.put_attribute(key, to_netcdf(value))?;
    }
    Ok(())
}

/// Every axis name with its length, in first-seen order.
fn dimensions(path: &Path, ds: &Dataset) -> Result<Vec<(String, usize)>, IoError> {
    let mut dims: Vec<(String, usize)> = Vec::new();
    for var in ds.variables() {
        for (name, &len) in var.dims().iter().zip(var.shape()) {
            match dims.iter().find(|(n, _)| n == name) {
                Some((_, known)) if *known != len => {
                    return Err(IoError::Layout {
                        path: path.to_path_buf(),
                        reason: format!("dimension '{name}' has lengths {known} and {len}"),
                    });
                }
                Some(_) => {}
                None => dims.push((name.clone(), len)),
            }
        }
    }
    Ok(dims)
}

fn write_coordinate(file: &mut netcdf::FileMut, name: &str, coord: &Coordinate) -> Result<(), IoError> {
    let dims: Vec<&str> = coord.dims().iter().map(String::as_str).collect();
    let mut var = file.add_variable::<f64>(name, &dims)?;
    put_attributes(&mut var, coord.attrs())?;
    match coord.values() {
        CoordValues::Time { dates, calendar } => {
            let (offsets, units) = encode_dates(dates, *calendar)?;
            var.put_attribute("units", units)?;
            var.put_attribute("calendar", calendar.name())?;
            var.put_values(&offsets, ..)?;
        }
        CoordValues::Numeric(values) => {
            let flat: Vec<f64> = values.iter().copied().collect();
            var.put_values(&flat, ..)?;
        }
    }
    Ok(())
}

/// Writes `ds` to a new NetCDF file at `path`.
///
/// Coordinates no variable spans are dropped first. Each coordinate is
/// written once under its name; time coordinates become day offsets with
/// CF `units` and `calendar`, so [`crate::open_dataset`] reads back the
/// same dates. Auxiliary coordinates are listed in each variable's
/// `coordinates` attribute. Missing values are stored as `NaN`.
///
/// # Errors
///
/// Returns [`IoError::Layout`] if one axis name has two lengths, and
/// [`IoError::Netcdf`] if the file cannot be created or written.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_dataset(path: &Path, ds: &Dataset) -> Result<(), IoError> {
    let ds = ds.remove_unused_coordinates();
    let dims = dimensions(path, &ds)?;
    let mut file = netcdf::create(path)?;

    for (key, value) in ds.attrs() {
        file.add_attribute(key, to_netcdf(value))?;
    }
    for (name, len) in &dims {
        file.add_dimension(name, *len)?;
    }

    let mut written: HashSet<String> = HashSet::new();
    for var in ds.variables() {
        for (name, coord) in var.coords() {
            if written.insert(name.to_string()) {
                write_coordinate(&mut file, name, coord)?;
            }
        }
    }
    debug!(dimensions = dims.len(), coordinates = written.len(), "wrote coordinates");

    for var in ds.variables() {
        let dims: Vec<&str> = var.dims().iter().map(String::as_str).collect();
        let auxiliary: Vec<&str> = var
            .coords()
            .map(|(name, _)| name)
            .filter(|name| !var.has_axis(name))
            .collect();
        let mut nc = file.add_variable::<f64>(var.name(), &dims)?;
        put_attributes(&mut nc, var.attrs())?;
        if !auxiliary.is_empty() {
            nc.put_attribute("coordinates", auxiliary.join(" "))?;
        }
        let flat: Vec<f64> = var.values().iter().copied().collect();
        nc.put_values(&flat, ..)?;
    }
    info!(variables = ds.len(), "wrote dataset");
    Ok(())
}
