//! Opening NetCDF datasets with canonical axis names.

use std::path::{Path, PathBuf};

use nino_grid::{AxisTag, Dataset, mask_value, resolve, roll_longitude};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read::read_dataset;

/// Canonical axis names given to the resolved time, longitude and latitude
/// axes when a dataset is opened.
pub const CANONICAL_AXES: [(AxisTag, &str); 3] = [
    (AxisTag::Time, "time"),
    (AxisTag::Longitude, "longitude"),
    (AxisTag::Latitude, "latitude"),
];

/// Options for [`open_dataset`].
///
/// Deserializable so the CLI can read them straight from its `[input]`
/// table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenOptions {
    /// Variables to keep; `None` keeps every variable in the file.
    pub variables: Option<Vec<String>>,
    /// Sentinel value masked to `NaN` on top of the file's own
    /// `_FillValue`.
    pub fill_value: Option<f64>,
    /// Rename axes, wrap longitude and sort latitude.
    pub canonicalize: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            variables: None,
            fill_value: None,
            canonicalize: true,
        }
    }
}

impl OpenOptions {
    pub fn with_variables<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.variables = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fill_value(mut self, sentinel: f64) -> Self {
        self.fill_value = Some(sentinel);
        self
    }

    pub fn with_canonicalize(mut self, yes: bool) -> Self {
        self.canonicalize = yes;
        self
    }
}

/// Sentinel masked in HadISST files when no `fill_value` is given.
pub const HADISST_FILL_VALUE: f64 = -1000.0;

/// Sentinel to mask for `path`: the configured one, else the HadISST
/// sentinel for files whose name mentions HadISST.
fn sentinel(path: &Path, options: &OpenOptions) -> Option<f64> {
    options.fill_value.or_else(|| {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        name.contains("hadisst").then_some(HADISST_FILL_VALUE)
    })
}

/// Opens the NetCDF file at `path`.
///
/// With `canonicalize` set (the default):
///
/// 1. the resolved time, longitude and latitude axes are renamed to
///    `time`, `longitude` and `latitude`;
/// 2. longitudes are wrapped into `[0, 360)` and rolled so the smallest
///    comes first;
/// 3. a 1-D latitude axis is sorted ascending.
///
/// The `fill_value` sentinel is masked last; files named like
/// `HadISST_sst.nc` get [`HADISST_FILL_VALUE`] when none is set.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `path` does not exist,
/// [`IoError::Netcdf`] for unreadable files,
/// [`IoError::MissingVariable`] for a requested variable that is not
/// stored, and time or grid errors raised while assembling the dataset.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn open_dataset(path: &Path, options: &OpenOptions) -> Result<Dataset, IoError> {
    let mut ds = read_dataset(path, options.variables.as_deref())?;
    if options.canonicalize {
        ds = canonicalize(&ds)?;
    }
    if let Some(sentinel) = sentinel(path, options) {
        debug!(sentinel, "masking fill value");
        ds = mask_value(&ds, sentinel);
    }
    info!(variables = ds.len(), "opened dataset");
    Ok(ds)
}

/// Expands directories into the `.nc` files they contain, sorted by name.
fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>, IoError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let entries = std::fs::read_dir(path).map_err(|e| IoError::Layout {
            path: path.clone(),
            reason: format!("cannot list directory: {e}"),
        })?;
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "nc"))
            .collect();
        found.sort();
        if found.is_empty() {
            return Err(IoError::FileNotFound { path: path.join("*.nc") });
        }
        files.extend(found);
    }
    Ok(files)
}

/// Opens several files, or directories of `.nc` files, as one dataset
/// joined along time.
///
/// Every file is opened with [`open_dataset`]. The parts are ordered by
/// their first date and concatenated along the time axis; variables
/// without a time axis and the attributes come from the earliest part.
///
/// # Errors
///
/// Same as [`open_dataset`], plus [`IoError::Layout`] when several files
/// have no time axis to join along, and grid errors when the parts do not
/// line up.
pub fn open_datasets<P: AsRef<Path>>(paths: &[P], options: &OpenOptions) -> Result<Dataset, IoError> {
    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    let files = expand(&paths)?;
    let mut parts = files
        .iter()
        .map(|path| open_dataset(path, options))
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() < 2 {
        return Ok(parts.pop().unwrap_or_default());
    }
    let Some(dim) = parts.first().and_then(|ds| resolve(ds, AxisTag::Time)) else {
        return Err(IoError::Layout {
            path: files[0].clone(),
            reason: "no time axis to join files along".to_string(),
        });
    };
    parts.sort_by_key(|ds| ds.time_bounds().map(|(start, _)| start));
    debug!(files = parts.len(), dim = %dim, "joining files");
    Ok(Dataset::concat(&parts, &dim)?)
}

/// Applies the canonical axis names, longitude range and latitude order.
///
/// # Errors
///
/// Returns grid errors from renaming, rolling or sorting.
pub fn canonicalize(ds: &Dataset) -> Result<Dataset, IoError> {
    let mut out = ds.clone();
    for (tag, canonical) in CANONICAL_AXES {
        let Some(found) = resolve(&out, tag) else {
            continue;
        };
        if found == canonical {
            continue;
        }
        debug!(from = %found, to = canonical, "renaming axis");
        out = out.try_map(|var| {
            if var.has_axis(&found) {
                var.rename_axis(&found, canonical)
            } else {
                Ok(var.rename_coord(&found, canonical))
            }
        })?;
    }
    out = roll_longitude(&out, None)?;
    out = out.try_map(|var| {
        let sortable = var.has_axis("latitude") && var.coord("latitude").is_some_and(|c| c.ndim() == 1);
        if sortable { var.sort_by_coord("latitude") } else { Ok(var.clone()) }
    })?;
    Ok(out)
}
