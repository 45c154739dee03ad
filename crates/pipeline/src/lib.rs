//! # nino-pipeline
//!
//! Runs named sequences of climate-field operators configured from TOML.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["Dataset"] -->|"prepare()"| B["selected source"]
//!     C["toml::Table"] -->|"Pipeline::from_specs()"| D["Pipeline"]
//!     B --> D
//!     D -->|"apply()"| E["Dataset"]
//!     D -.->|"soft failure"| F["PipelineError::Halted"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nino_pipeline::Pipeline;
//!
//! let specs: toml::Table = toml::from_str(r#"
//!     ["1--detrend"]
//!     ["2--interannual_anomalies"]
//!     ["3--average"]
//!     dim = ["X", "Y"]
//!     weights = true
//!     ["4--season_mean"]
//!     season = "NDJ"
//! "#)?;
//! let index = Pipeline::from_specs(&specs)?.apply(&sst)?;
//! ```
//!
//! ## Operators
//!
//! | Name | Scope | Settings |
//! |------|-------|----------|
//! | `average` | selected variables | `dim` (`"T"`), `weights`, `skipna` |
//! | `average_moving` | data variables | `dim` (`"T"`), `window` (3), `min_periods` |
//! | `detrend` | selected variables | `deg` (1) |
//! | `interannual_anomalies` | data variables | |
//! | `netcdf_selector` | dataset | `bounds` |
//! | `normalize` | data variables | `ddof` (0) |
//! | `reshape_lead_lag` | selected variables | `delta` (12), `window` (24) |
//! | `season_mean` | data variables | `season` (`"NDJ"`), `min_periods` |
//! | `seasonal_cycle` | data variables | |
//!
//! Operators on selected variables return only those variables.

mod dispatch;
mod error;
mod ops;
mod reader;
mod registry;

pub use dispatch::{KEY_SEPARATOR, Pipeline, operator_name};
pub use error::PipelineError;
pub use ops::{
    Average, AverageMoving, BoundsSelect, Detrend, InterannualAnomalies, Normalize, Operator, ReshapeLeadLag,
    SeasonMean, SeasonalCycle,
};
pub use reader::{READER_STEP, RegionalMean, SourceOptions, prepare};
pub use registry::{Builder, REGISTRY, lookup, operator_names};
