//! Calendar dates with an optional time of day.

use std::fmt;

use crate::bound::parse_fields;
use crate::calendar::Calendar;
use crate::error::CalendarError;

const SECONDS_PER_DAY: i64 = 86_400;

/// A date and time of day in some [`Calendar`].
///
/// The date does not carry its calendar; every calendar-dependent
/// operation takes it as an argument, the same way a time axis stores one
/// calendar for all of its values. Ordering is field-wise
/// (year, month, day, hour, minute, second), which is also chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CalendarDate {
    /// Creates a date at midnight.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError`] if the month or day does not exist in
    /// `calendar`.
    pub fn new(calendar: Calendar, year: i32, month: u8, day: u8) -> Result<Self, CalendarError> {
        let max_day = calendar.days_in_month(year, month)?;
        if day == 0 || day > max_day {
            return Err(CalendarError::InvalidDay {
                day,
                month,
                max_day,
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        })
    }

    /// Returns a copy with the given time of day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidTimeOfDay`] outside 00:00:00..=23:59:59.
    pub fn with_time(self, hour: u8, minute: u8, second: u8) -> Result<Self, CalendarError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(CalendarError::InvalidTimeOfDay {
                hour,
                minute,
                second,
            });
        }
        Ok(Self {
            hour,
            minute,
            second,
            ..self
        })
    }

    /// Parses `"YYYY[-MM[-DD[ HH[:MM[:SS]]]]]"`; missing fields default to
    /// the start of the period. A `T` may separate date and time.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Parse`] for malformed input, or a validation
    /// error if the date does not exist in `calendar`.
    pub fn parse(calendar: Calendar, input: &str) -> Result<Self, CalendarError> {
        let fields = parse_fields(input)?;
        let get = |i: usize, default: i64| fields.get(i).copied().unwrap_or(default);
        let narrow = |v: i64| {
            u8::try_from(v).map_err(|_| CalendarError::Parse {
                input: input.to_string(),
                reason: format!("field value {v} out of range"),
            })
        };
        let year = i32::try_from(get(0, 0)).map_err(|_| CalendarError::Parse {
            input: input.to_string(),
            reason: "year out of range".to_string(),
        })?;
        Self::new(calendar, year, narrow(get(1, 1))?, narrow(get(2, 1))?)?.with_time(
            narrow(get(3, 0))?,
            narrow(get(4, 0))?,
            narrow(get(5, 0))?,
        )
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn day(self) -> u8 {
        self.day
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn second(self) -> u8 {
        self.second
    }

    /// All six fields, most significant first.
    pub fn fields(self) -> [i64; 6] {
        [
            i64::from(self.year),
            i64::from(self.month),
            i64::from(self.day),
            i64::from(self.hour),
            i64::from(self.minute),
            i64::from(self.second),
        ]
    }

    /// Seconds elapsed since midnight.
    pub fn seconds_of_day(self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    /// Day of the year, starting at 1 for January 1st.
    pub fn day_of_year(self, calendar: Calendar) -> u16 {
        let before: u16 = (1..self.month)
            .map(|m| u16::from(calendar.month_length(self.year, m)))
            .sum();
        before + u16::from(self.day)
    }

    /// Days elapsed since 0000-01-01T00:00:00, including the time of day.
    pub fn ordinal_days(self, calendar: Calendar) -> f64 {
        let whole = calendar.days_before_year(self.year) + i64::from(self.day_of_year(calendar)) - 1;
        whole as f64 + f64::from(self.seconds_of_day()) / SECONDS_PER_DAY as f64
    }

    /// Inverse of [`CalendarDate::ordinal_days`], rounded to the nearest second.
    pub fn from_ordinal_days(calendar: Calendar, days: f64) -> Self {
        let total_seconds = (days * SECONDS_PER_DAY as f64).round() as i64;
        let whole = total_seconds.div_euclid(SECONDS_PER_DAY);
        let seconds = total_seconds.rem_euclid(SECONDS_PER_DAY);

        let mut year = (whole as f64 / calendar.mean_year_length()).floor() as i32;
        while calendar.days_before_year(year) > whole {
            year -= 1;
        }
        while calendar.days_before_year(year + 1) <= whole {
            year += 1;
        }

        let mut remaining = whole - calendar.days_before_year(year);
        let mut month = 1u8;
        loop {
            let len = i64::from(calendar.month_length(year, month));
            if remaining < len || month == 12 {
                break;
            }
            remaining -= len;
            month += 1;
        }

        Self {
            year,
            month,
            day: (remaining + 1) as u8,
            hour: (seconds / 3600) as u8,
            minute: ((seconds % 3600) / 60) as u8,
            second: (seconds % 60) as u8,
        }
    }

    /// The date as a fractional year: `year + elapsed / length_of_year`.
    pub fn fractional_year(self, calendar: Calendar) -> f64 {
        let elapsed = f64::from(self.day_of_year(calendar) - 1)
            + f64::from(self.seconds_of_day()) / SECONDS_PER_DAY as f64;
        f64::from(self.year) + elapsed / f64::from(calendar.days_in_year(self.year))
    }

    /// Shifts the date by whole months, clamping the day to the target month's length.
    pub fn add_months(self, calendar: Calendar, months: i32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        let year = index.div_euclid(12) as i32;
        let month = (index.rem_euclid(12) + 1) as u8;
        let day = self.day.min(calendar.month_length(year, month));
        Self {
            year,
            month,
            day,
            ..self
        }
    }

    /// Shifts the date by whole days.
    pub fn add_days(self, calendar: Calendar, days: i64) -> Self {
        Self::from_ordinal_days(calendar, self.ordinal_days(calendar) + days as f64)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.seconds_of_day() != 0 {
            write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        }
        Ok(())
    }
}
