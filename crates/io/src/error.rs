//! Error types for nino-io.

use std::path::PathBuf;

use nino_calendar::CalendarError;
use nino_grid::GridError;

/// Error type for all fallible operations in the nino-io crate.
///
/// Covers missing files, NetCDF library failures, layouts the data model
/// cannot hold, time decoding and data-model errors raised while
/// assembling a dataset.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when a file's structure cannot be represented, such as
    /// one dimension with two lengths or nothing to join files along.
    #[error("unsupported layout in {}: {reason}", path.display())]
    Layout {
        /// Path of the file.
        path: PathBuf,
        /// What does not fit.
        reason: String,
    },

    /// Returned when a requested variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a time coordinate cannot be decoded.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time decoding issue.
        reason: String,
    },

    /// Wrapped calendar error.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Wrapped grid error.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/data/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /data/missing.nc");
    }

    #[test]
    fn display_missing_variable() {
        let err = IoError::MissingVariable {
            name: "sst".to_string(),
            path: PathBuf::from("/data/hadisst.nc"),
        };
        assert_eq!(err.to_string(), "variable 'sst' not found in /data/hadisst.nc");
    }

    #[test]
    fn display_layout() {
        let err = IoError::Layout {
            path: PathBuf::from("out.nc"),
            reason: "dimension 'time' has lengths 12 and 24".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported layout in out.nc: dimension 'time' has lengths 12 and 24"
        );
    }

    #[test]
    fn display_invalid_time() {
        let err = IoError::InvalidTime {
            reason: "unexpected units 'months since 1870-01-01'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid time: unexpected units 'months since 1870-01-01'"
        );
    }

    #[test]
    fn from_netcdf_error() {
        let nc_err = netcdf::Error::Str("bad header".to_string());
        let err: IoError = nc_err.into();
        assert!(matches!(err, IoError::Netcdf { .. }));
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn from_calendar_error() {
        let err: IoError = CalendarError::UnknownCalendar {
            name: "lunar".to_string(),
        }
        .into();
        assert!(matches!(err, IoError::Calendar(_)));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
