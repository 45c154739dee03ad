//! Interface to an external mode-decomposition solver.

use nino_grid::LabeledArray;
use serde::Deserialize;

use crate::error::EofError;

/// Options forwarded to the decomposition service.
///
/// `n_modes` and `use_coslat` are understood by every service; anything
/// else in the table lands in `extra` and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EofOptions {
    /// Number of modes to retain.
    pub n_modes: usize,
    /// Weight grid points by the square root of cos(latitude).
    pub use_coslat: bool,
    /// Service-specific settings.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for EofOptions {
    fn default() -> Self {
        Self {
            n_modes: 1,
            use_coslat: true,
            extra: toml::Table::new(),
        }
    }
}

impl EofOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_modes(mut self, n_modes: usize) -> Self {
        self.n_modes = n_modes;
        self
    }

    pub fn with_use_coslat(mut self, use_coslat: bool) -> Self {
        self.use_coslat = use_coslat;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Raw output of a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeFit {
    /// Spatial patterns, dims `[mode, <other axes of the input>]`, normalised
    /// by the service.
    pub components: LabeledArray,
    /// Principal component series, dims `[mode, <decomposition axis>]`.
    pub scores: LabeledArray,
    /// Fraction of variance carried by each mode, in `[0, 1]`.
    pub explained_variance_ratio: Vec<f64>,
}

/// A solver for empirical orthogonal modes along one axis.
pub trait ModeDecomposition {
    /// Decomposes `data` along the axis named `dim`.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as [`EofError::Service`].
    fn fit(&self, data: &LabeledArray, dim: &str, options: &EofOptions) -> Result<ModeFit, EofError>;
}
