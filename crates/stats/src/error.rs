//! Error types for the nino-stats crate.

use nino_grid::GridError;

/// Error type for all fallible operations in the nino-stats crate.
///
/// Like [`GridError`], variants are either soft ([`StatsError::is_soft`]),
/// meaning the operator does not apply to the data it was given, or hard.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Wraps an error originating from the nino-grid crate.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Returned when the alternative hypothesis is not one of
    /// `greater`, `less` or `two-sided` (soft).
    #[error("invalid alternative hypothesis: '{value}' (expected greater, less or two-sided)")]
    InvalidAlternative {
        /// The value that was provided.
        value: String,
    },

    /// Returned when a season code is not one of the twelve 3-month codes.
    #[error("invalid season: '{value}' (expected one of DJF, JFM, ..., NDJ)")]
    InvalidSeason {
        /// The value that was provided.
        value: String,
    },

    /// Returned when a rolling or splice window is unusable.
    #[error("invalid window {window}: {reason}")]
    InvalidWindow {
        /// The window length that was provided.
        window: usize,
        /// Why it was rejected.
        reason: String,
    },

    /// Returned when too few observations remain for a computation (soft).
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData {
        /// Minimum number of observations required.
        needed: usize,
        /// Number of observations available.
        got: usize,
    },

    /// Returned when a statistical distribution cannot be constructed.
    #[error("distribution error: {reason}")]
    Distribution {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl StatsError {
    /// `true` for failures meaning "not applicable" rather than "broken".
    pub fn is_soft(&self) -> bool {
        match self {
            Self::Grid(e) => e.is_soft(),
            Self::InvalidAlternative { .. } | Self::InsufficientData { .. } => true,
            _ => false,
        }
    }
}
