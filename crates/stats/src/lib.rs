//! # nino-stats
//!
//! Statistical operators over [`nino_grid::LabeledArray`]s: weighted
//! reductions, moving averages, seasonal cycles and anomalies, polynomial
//! detrending, lead-lag reshaping and pointwise linear regression.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["LabeledArray"] -->|"mean() / std()"| B["reduced array"]
//!     A -->|"moving_average()"| C["smoothed array"]
//!     A -->|"interannual_anomalies()"| D["anomalies"]
//!     D -->|"season_mean()"| E["year series"]
//!     A -->|"remove_fit()"| F["residual"]
//!     A -->|"reshape_lead_lag()"| G["year x month"]
//!     E -->|"linear_regression()"| H["RegressionResult"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nino_stats::{Season, interannual_anomalies, remove_fit, season_mean};
//!
//! let sst = ds.require("sst")?;
//! let detrended = remove_fit(sst, 1, &"T".into())?;
//! let anomalies = interannual_anomalies(&detrended)?;
//! let ndj = season_mean(&anomalies, Season::Ndj, None)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `weighted` | Weighted mean, variance and standard deviation |
//! | `rolling` | Centered moving averages |
//! | `seasonal` | Seasonal cycle, anomalies, season means, normalization |
//! | `detrend` | Polynomial trend removal |
//! | `splice` | Lead-lag reshaping into overlapping windows |
//! | `regression` | Pointwise linear regression with p-values |
//! | `regional` | Regional mean removal |
//! | `series` | NaN-aware scalar statistics on slices |
//! | `error` | Error types |

mod detrend;
mod error;
mod lstsq;
mod regional;
mod regression;
mod rolling;
mod seasonal;
pub mod series;
mod splice;
mod weighted;

pub use detrend::remove_fit;
pub use error::StatsError;
pub use lstsq::PolyFit;
pub use regional::remove_regional_mean;
pub use regression::{Alternative, RegressionOptions, RegressionResult, linear_regression};
pub use rolling::moving_average;
pub use seasonal::{Season, get_season, interannual_anomalies, normalize, season_mean, seasonal_cycle};
pub use splice::{reshape_lead_lag, reshape_splice, segment_count, splice};
pub use weighted::{Weights, mean, std, variance};
