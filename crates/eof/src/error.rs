//! Error types for the nino-eof crate.

use nino_grid::GridError;
use nino_stats::StatsError;

/// Error type for the EOF adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EofError {
    /// Wrapped grid error (axis resolution, broadcasting).
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Wrapped statistics error (score standard deviation).
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Returned when the decomposition service itself fails.
    #[error("mode decomposition failed: {reason}")]
    Service {
        /// Message reported by the service.
        reason: String,
    },

    /// Returned when the service output does not have the expected layout.
    #[error("invalid mode fit: {reason}")]
    InvalidFit {
        /// What is wrong with the fit.
        reason: String,
    },
}

impl EofError {
    /// Whether the error only means the decomposition does not apply.
    pub fn is_soft(&self) -> bool {
        match self {
            Self::Grid(e) => e.is_soft(),
            Self::Stats(e) => e.is_soft(),
            Self::Service { .. } | Self::InvalidFit { .. } => false,
        }
    }
}
