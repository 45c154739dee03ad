//! Error types for the nino-grid crate.

use nino_calendar::CalendarError;

/// Error type for all fallible operations in the nino-grid crate.
///
/// Variants fall into two classes. Soft failures ([`GridError::is_soft`])
/// mean an operation does not apply to the given data, for example a
/// semantic axis that cannot be resolved; a pipeline stops on them without
/// treating them as a fault. Every other variant is a hard failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when an axis tag or name could not be resolved (soft).
    #[error("axis '{axis}' could not be resolved")]
    UnresolvedAxis {
        /// The axis as requested (`T`, `X`, `Y` or a literal name).
        axis: String,
    },

    /// Returned when a caller requests a literal axis name that does not exist.
    #[error("axis '{name}' not found (available: {available})")]
    MissingAxis {
        /// The requested axis name.
        name: String,
        /// Comma-separated list of available axis names.
        available: String,
    },

    /// Returned when the number of axis names does not match the array rank.
    #[error("{dims} axis name(s) given for an array of rank {ndim}")]
    RankMismatch {
        /// Number of axis names provided.
        dims: usize,
        /// Rank of the value buffer.
        ndim: usize,
    },

    /// Returned when an axis name appears twice in one array.
    #[error("duplicate axis name '{name}'")]
    DuplicateAxis {
        /// The repeated axis name.
        name: String,
    },

    /// Returned when two buffers that must agree in shape do not.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// The required shape.
        expected: Vec<usize>,
        /// The shape that was supplied.
        got: Vec<usize>,
    },

    /// Returned when a coordinate does not fit the axes it labels.
    #[error("coordinate '{name}': {reason}")]
    InvalidCoordinate {
        /// Name of the coordinate.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when an axis must carry dates but does not.
    #[error("axis '{name}' is not a time axis")]
    NotTimeAxis {
        /// The axis name.
        name: String,
    },

    /// Returned when an array cannot be broadcast against another.
    #[error("cannot broadcast {from:?} onto {to:?}")]
    Broadcast {
        /// Axis names of the array being broadcast.
        from: Vec<String>,
        /// Axis names of the target.
        to: Vec<String>,
    },

    /// Returned when a variable name is added twice to a dataset.
    #[error("duplicate variable '{name}'")]
    DuplicateVariable {
        /// The repeated variable name.
        name: String,
    },

    /// Returned when a requested variable is not in a dataset.
    #[error("variable '{name}' not found")]
    MissingVariable {
        /// The requested variable name.
        name: String,
    },

    /// Returned when aligning two arrays leaves no common labels (soft).
    #[error("no common labels along axis '{axis}'")]
    EmptyAlignment {
        /// The axis along which alignment was attempted.
        axis: String,
    },

    /// Wraps an error originating from the nino-calendar crate.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl GridError {
    /// `true` for failures meaning "not applicable" rather than "broken".
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedAxis { .. } | Self::EmptyAlignment { .. }
        )
    }

    pub(crate) fn unresolved(axis: impl ToString) -> Self {
        Self::UnresolvedAxis {
            axis: axis.to_string(),
        }
    }
}
