//! # nino-calendar
//!
//! Date arithmetic for the CF calendars found in gridded climate data.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["Calendar"] -->|"days_in_month()"| B["month lengths"]
//!     C["CalendarDate"] -->|"ordinal_days()"| D["f64 abscissa"]
//!     C -->|"fractional_year()"| E["year fraction"]
//!     F["&[CalendarDate]"] -->|"days_per_month()"| G["monthly weights"]
//!     H["TimeBound"] -->|"compare()"| C
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nino_calendar::{Calendar, CalendarDate, TimeBound, days_per_month, monthly_sequence};
//!
//! let cal: Calendar = "noleap".parse().unwrap();
//! let start = CalendarDate::new(cal, 1979, 12, 16).unwrap();
//! let dates = monthly_sequence(cal, start, 36);
//!
//! // February weighs 28 days in a noleap calendar
//! let weights = days_per_month(&dates, cal);
//!
//! // Partial bounds compare only on the fields they name
//! let lower = TimeBound::parse("1980-01-01").unwrap();
//! assert!(lower.is_after(&dates[0]));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `calendar` | Calendar identifiers and leap-year rules |
//! | `date` | Date and time of day, ordinal and fractional-year conversion |
//! | `bound` | Partial date bounds |
//! | `weights` | Days-per-month and fractional-year series |
//! | `sequence` | Monthly and daily sequences |
//! | `error` | Error types |

mod bound;
mod calendar;
mod date;
mod error;
mod sequence;
mod weights;

pub use bound::TimeBound;
pub use calendar::Calendar;
pub use date::CalendarDate;
pub use error::CalendarError;
pub use sequence::{daily_sequence, monthly_sequence};
pub use weights::{days_per_month, fractional_years, ordinal_days};
