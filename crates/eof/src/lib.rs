//! # nino-eof
//!
//! Empirical orthogonal function (EOF) patterns in physical units.
//!
//! The decomposition itself is delegated to a [`ModeDecomposition`]
//! service; this crate resolves the decomposition axis, rescales the
//! normalised components by the spread of their scores and records the
//! explained variance.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nino_eof::{EofOptions, eof_modes};
//!
//! let options = EofOptions::new().with_n_modes(2);
//! let patterns = eof_modes(&solver, &sst_anomalies, &"T".into(), &options)?;
//! let percent = patterns.attrs().get("explained_variance");
//! ```

mod adapter;
mod error;
mod service;

pub use adapter::{MODE_DIM, eof_modes, eofs};
pub use error::EofError;
pub use service::{EofOptions, ModeDecomposition, ModeFit};
