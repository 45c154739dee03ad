//! Per-time-step numeric series derived from dates.

use crate::calendar::Calendar;
use crate::date::CalendarDate;

/// Number of days in the month of each date, as weights for monthly means.
///
/// ```ignore
/// let w = days_per_month(&dates, Calendar::NoLeap);
/// // January 31.0, February 28.0, ...
/// ```
pub fn days_per_month(dates: &[CalendarDate], calendar: Calendar) -> Vec<f64> {
    dates
        .iter()
        .map(|d| f64::from(calendar.month_length(d.year(), d.month())))
        .collect()
}

/// Fractional-year value of each date.
pub fn fractional_years(dates: &[CalendarDate], calendar: Calendar) -> Vec<f64> {
    dates.iter().map(|d| d.fractional_year(calendar)).collect()
}

/// Days since 0000-01-01 for each date.
pub fn ordinal_days(dates: &[CalendarDate], calendar: Calendar) -> Vec<f64> {
    dates.iter().map(|d| d.ordinal_days(calendar)).collect()
}
