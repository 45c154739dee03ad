//! # nino-io
//!
//! NetCDF reading and writing for labeled climate datasets. Opening a file
//! renames the time, longitude and latitude axes to canonical names, wraps
//! longitude into `[0, 360)`, sorts latitude ascending and masks fill
//! values, so every downstream operator sees the same layout. Several
//! files are joined along time.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use nino_io::{OpenOptions, open_datasets, write_dataset};
//!
//! let opts = OpenOptions::default().with_variables(["sst"]);
//! let ds = open_datasets(&["sst_1980s.nc", "sst_1990s.nc"], &opts)?;
//! write_dataset(Path::new("out.nc"), &ds)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `netcdf_read` | Variable, attribute and coordinate extraction |
//! | `time` | CF-style time unit decoding and encoding |
//! | `reader` | [`open_dataset`], [`open_datasets`], [`canonicalize`] |
//! | `writer` | [`write_dataset`] |
//! | `error` | Error types |

mod error;
mod netcdf_read;
mod reader;
mod time;
mod writer;

pub use error::IoError;
pub use reader::{CANONICAL_AXES, HADISST_FILL_VALUE, OpenOptions, canonicalize, open_dataset, open_datasets};
pub use writer::write_dataset;
