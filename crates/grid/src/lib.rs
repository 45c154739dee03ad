//! # nino-grid
//!
//! Coordinate-labeled arrays and datasets for gridded, time-indexed fields,
//! with the axis resolution and bounds selection the statistical operators
//! build on.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["AxisTag (T/X/Y)"] -->|"resolve()"| B["axis name"]
//!     C["Dataset"] -->|"variables()"| D["LabeledArray"]
//!     D -->|"coord()"| E["Coordinate"]
//!     B --> F["select()"]
//!     G["Bounds"] --> F
//!     F -->|"roll_longitude()"| C
//!     F -->|"check_time_bounds()"| C
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nino_grid::{AxisTag, Bounds, Dataset, resolve, select};
//!
//! let time = resolve(&ds, AxisTag::Time); // Some("time")
//! let bounds = Bounds::new()
//!     .with_dates("T", "1980-01-01", "2014-12-31")?
//!     .with_degrees("X", -60.0, 30.0) // longitude is rolled first
//!     .with_degrees("Y", -5.0, 5.0);
//! let region = select(&ds, &bounds)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `array` | `LabeledArray`: values, axis names, coordinates, attributes |
//! | `dataset` | `Dataset`: named collection of arrays |
//! | `coord` | Numeric and date coordinates |
//! | `attrs` | Attribute values |
//! | `axis` | Axis tags, resolution and literal-name checks |
//! | `select` | Bounds selection, longitude rolling, time-bound checks |
//! | `mask` | Constant-through-time and sentinel masks |
//! | `align` | Inner-join alignment along one axis |
//! | `error` | Error types |

mod align;
mod array;
mod attrs;
mod axis;
mod coord;
mod dataset;
mod error;
mod mask;
mod select;

pub use align::align;
pub use array::LabeledArray;
pub use attrs::{AttrValue, Attributes};
pub use axis::{AxisRef, AxisSource, AxisTag, OnMissing, check_axis, require_axis, resolve};
pub use coord::{CoordValues, Coordinate};
pub use dataset::Dataset;
pub use error::GridError;
pub use mask::{constant_mask, mask_value};
pub use select::{Bound, BoundSide, Bounds, check_time_bounds, is_curvilinear, roll_longitude, select};
