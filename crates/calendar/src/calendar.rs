//! CF calendar identifiers and their leap-year rules.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Days per month for a common (non-leap) year.
const MONTH_DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// First year of the Gregorian reform in the `standard` calendar.
const GREGORIAN_START: i32 = 1583;

/// A CF-conventions calendar.
///
/// `Standard` (alias `gregorian`) follows the Julian leap rule before
/// 1583 and the Gregorian rule from 1583 onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Calendar {
    /// Mixed Julian/Gregorian calendar.
    #[default]
    Standard,
    /// Gregorian rule applied to all years.
    ProlepticGregorian,
    /// Julian rule applied to all years.
    Julian,
    /// Every year has 365 days.
    NoLeap,
    /// Every year has 366 days.
    AllLeap,
    /// Every month has 30 days.
    Day360,
}

impl Calendar {
    /// Canonical CF name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::ProlepticGregorian => "proleptic_gregorian",
            Self::Julian => "julian",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    /// Returns `true` if `year` has a 29th of February in this calendar.
    ///
    /// Always `false` for [`Calendar::Day360`], whose Februaries have 30 days.
    pub fn is_leap(self, year: i32) -> bool {
        match self {
            Self::Standard if year < GREGORIAN_START => julian_leap(year),
            Self::Standard | Self::ProlepticGregorian => gregorian_leap(year),
            Self::Julian => julian_leap(year),
            Self::AllLeap => true,
            Self::NoLeap | Self::Day360 => false,
        }
    }

    /// Number of days in `month` of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn days_in_month(self, year: i32, month: u8) -> Result<u8, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(self.month_length(year, month))
    }

    /// Month length for a month already known to be in 1..=12.
    pub(crate) fn month_length(self, year: i32, month: u8) -> u8 {
        if self == Self::Day360 {
            return 30;
        }
        let base = MONTH_DAYS[usize::from(month.clamp(1, 12) - 1)];
        if month == 2 && self.is_leap(year) {
            base + 1
        } else {
            base
        }
    }

    /// Number of days in `year`.
    pub fn days_in_year(self, year: i32) -> u16 {
        match self {
            Self::Day360 => 360,
            _ if self.is_leap(year) => 366,
            _ => 365,
        }
    }

    /// Days elapsed between 0000-01-01 and January 1st of `year`.
    ///
    /// Negative for years before year 0.
    pub fn days_before_year(self, year: i32) -> i64 {
        let y = i64::from(year);
        match self {
            Self::NoLeap => 365 * y,
            Self::AllLeap => 366 * y,
            Self::Day360 => 360 * y,
            Self::Julian => 365 * y + julian_leaps_before(y),
            Self::ProlepticGregorian => 365 * y + gregorian_leaps_before(y),
            Self::Standard => {
                let reform = i64::from(GREGORIAN_START);
                if y <= reform {
                    365 * y + julian_leaps_before(y)
                } else {
                    365 * y + julian_leaps_before(reform) + gregorian_leaps_before(y)
                        - gregorian_leaps_before(reform)
                }
            }
        }
    }

    /// Mean year length, used to seed year searches.
    pub(crate) fn mean_year_length(self) -> f64 {
        match self {
            Self::NoLeap => 365.0,
            Self::AllLeap => 366.0,
            Self::Day360 => 360.0,
            Self::Julian => 365.25,
            Self::Standard | Self::ProlepticGregorian => 365.2425,
        }
    }
}

fn julian_leap(year: i32) -> bool {
    year.rem_euclid(4) == 0
}

fn gregorian_leap(year: i32) -> bool {
    (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
}

/// Count of Julian leap years in `[0, y)` (negative when `y < 0`).
fn julian_leaps_before(y: i64) -> i64 {
    (y + 3).div_euclid(4)
}

/// Count of Gregorian leap years in `[0, y)` (negative when `y < 0`).
fn gregorian_leaps_before(y: i64) -> i64 {
    (y + 3).div_euclid(4) - (y + 99).div_euclid(100) + (y + 399).div_euclid(400)
}

impl FromStr for Calendar {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Self::Standard),
            "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "julian" => Ok(Self::Julian),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            _ => Err(CalendarError::UnknownCalendar {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
