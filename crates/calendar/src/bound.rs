//! Partial date bounds compared field by field.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::date::CalendarDate;
use crate::error::CalendarError;

/// Splits a date string into numeric fields.
///
/// Separators are `-`, `T`, space and `:`; at most six fields are read and
/// a fractional seconds part is truncated.
pub(crate) fn parse_fields(input: &str) -> Result<Vec<i64>, CalendarError> {
    let trimmed = input.trim().trim_end_matches('Z');
    if trimmed.is_empty() {
        return Err(CalendarError::Parse {
            input: input.to_string(),
            reason: "empty date".to_string(),
        });
    }
    let parts: Vec<&str> = trimmed
        .split(['-', 'T', ' ', ':'])
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() > 6 {
        return Err(CalendarError::Parse {
            input: input.to_string(),
            reason: format!("expected at most 6 fields, got {}", parts.len()),
        });
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let value = if i == 5 {
                part.parse::<f64>().ok().map(|s| s.trunc() as i64)
            } else {
                part.parse::<i64>().ok()
            };
            value.ok_or_else(|| CalendarError::Parse {
                input: input.to_string(),
                reason: format!("non-numeric field '{part}'"),
            })
        })
        .collect()
}

/// A date bound such as `"1980-01-01"` or `"2014-12"`.
///
/// Only the fields written in the bound take part in comparisons, so
/// `"2014-12-31"` matches every time of that day and `"2014"` every date of
/// that year.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeBound {
    fields: Vec<i64>,
}

impl TimeBound {
    /// Parses a bound string.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Parse`] for empty or non-numeric input.
    pub fn parse(input: &str) -> Result<Self, CalendarError> {
        Ok(Self {
            fields: parse_fields(input)?,
        })
    }

    /// The parsed fields, most significant first.
    pub fn fields(&self) -> &[i64] {
        &self.fields
    }

    /// Compares `date` against this bound on the bound's fields only.
    pub fn compare(&self, date: &CalendarDate) -> Ordering {
        let n = self.fields.len();
        date.fields()[..n].cmp(&self.fields[..])
    }

    /// `true` if `date` is strictly before the bound.
    pub fn is_after(&self, date: &CalendarDate) -> bool {
        self.compare(date) == Ordering::Less
    }

    /// `true` if `date` is strictly after the bound.
    pub fn is_before(&self, date: &CalendarDate) -> bool {
        self.compare(date) == Ordering::Greater
    }
}

impl FromStr for TimeBound {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.fields.iter().enumerate() {
            match i {
                0 => write!(f, "{v:04}")?,
                1 | 2 => write!(f, "-{v:02}")?,
                3 => write!(f, " {v:02}")?,
                _ => write!(f, ":{v:02}")?,
            }
        }
        Ok(())
    }
}
