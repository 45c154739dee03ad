//! Error types for the nino-calendar crate.

/// Error type for all fallible operations in the nino-calendar crate.
///
/// This enum covers validation failures for calendar names, month and
/// day numbers, times of day, and date strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a calendar name is not one of the CF calendar names.
    #[error("unknown calendar: '{name}'")]
    UnknownCalendar {
        /// The calendar name that was provided.
        name: String,
    },

    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a day number exceeds the number of days in the given month.
    #[error("invalid day: {day} for month {month} (max {max_day})")]
    InvalidDay {
        /// The invalid day number that was provided.
        day: u8,
        /// The month for which the day is invalid.
        month: u8,
        /// The maximum valid day for the given month.
        max_day: u8,
    },

    /// Returned when a time of day is outside 00:00:00..=23:59:59.
    #[error("invalid time of day: {hour:02}:{minute:02}:{second:02}")]
    InvalidTimeOfDay {
        /// Hour component.
        hour: u8,
        /// Minute component.
        minute: u8,
        /// Second component.
        second: u8,
    },

    /// Returned when a date or bound string cannot be parsed.
    #[error("cannot parse '{input}': {reason}")]
    Parse {
        /// The string that failed to parse.
        input: String,
        /// Why parsing failed.
        reason: String,
    },
}
