//! Decoding of stored time coordinates.

use nino_calendar::{Calendar, CalendarDate};

use crate::error::IoError;

/// Step length of a CF `"<unit> since <date>"` string, in days.
fn unit_days(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "days" | "day" | "d" => Some(1.0),
        "hours" | "hour" | "h" => Some(1.0 / 24.0),
        "minutes" | "minute" => Some(1.0 / 1440.0),
        "seconds" | "second" | "s" => Some(1.0 / 86_400.0),
        _ => None,
    }
}

/// Parses `"days since 1850-01-01"` (or hours, minutes, seconds) into the
/// step length in days and the reference date.
pub(crate) fn parse_units(units: &str, calendar: Calendar) -> Result<(f64, CalendarDate), IoError> {
    let parts: Vec<&str> = units.trim().splitn(3, ' ').collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(IoError::InvalidTime {
            reason: format!("unexpected time units '{units}'"),
        });
    }
    let step = unit_days(parts[0]).ok_or_else(|| IoError::InvalidTime {
        reason: format!("unsupported time unit '{}' in '{units}'", parts[0]),
    })?;
    // drop a trailing time zone such as "UTC" or "Z"
    let reference = parts[2].trim().trim_end_matches(" UTC").trim_end_matches('Z');
    let base = CalendarDate::parse(calendar, reference)?;
    Ok((step, base))
}

/// Dates at `offsets` steps of `units` in `calendar`.
pub(crate) fn decode_offsets(offsets: &[f64], units: &str, calendar: Calendar) -> Result<Vec<CalendarDate>, IoError> {
    let (step, base) = parse_units(units, calendar)?;
    let origin = base.ordinal_days(calendar);
    offsets
        .iter()
        .map(|&offset| {
            if !offset.is_finite() {
                return Err(IoError::InvalidTime {
                    reason: format!("non-finite time offset {offset}"),
                });
            }
            Ok(CalendarDate::from_ordinal_days(calendar, origin + offset * step))
        })
        .collect()
}

/// Day offsets of `dates` and their CF units, counted from January 1 of
/// the first date's year.
pub(crate) fn encode_dates(dates: &[CalendarDate], calendar: Calendar) -> Result<(Vec<f64>, String), IoError> {
    let year = dates.first().map_or(1970, |d| d.year());
    let base = CalendarDate::new(calendar, year, 1, 1)?;
    let origin = base.ordinal_days(calendar);
    let offsets = dates.iter().map(|d| d.ordinal_days(calendar) - origin).collect();
    Ok((offsets, format!("days since {base}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_since_in_noleap() {
        let dates = decode_offsets(&[0.0, 59.0, 365.0], "days since 2000-01-01", Calendar::NoLeap).unwrap();
        assert_eq!(dates[0].to_string(), "2000-01-01");
        // no February 29 in a noleap calendar
        assert_eq!(dates[1].to_string(), "2000-03-01");
        assert_eq!(dates[2].to_string(), "2001-01-01");
    }

    #[test]
    fn days_since_in_standard() {
        let dates = decode_offsets(&[59.0], "days since 2000-01-01", Calendar::Standard).unwrap();
        assert_eq!(dates[0].to_string(), "2000-02-29");
    }

    #[test]
    fn hours_since_with_reference_time() {
        let dates = decode_offsets(&[36.0], "hours since 1979-12-31 00:00:00", Calendar::Standard).unwrap();
        assert_eq!(dates[0].to_string(), "1980-01-01 12:00:00");
    }

    #[test]
    fn rejects_month_units() {
        assert!(matches!(
            parse_units("months since 1870-01-01", Calendar::Standard),
            Err(IoError::InvalidTime { .. })
        ));
        assert!(parse_units("1870-01-01", Calendar::Standard).is_err());
    }

    #[test]
    fn encoded_dates_decode_back() {
        let dates = decode_offsets(&[15.5, 45.0, 409.5], "days since 1981-01-01", Calendar::Day360).unwrap();
        let (offsets, units) = encode_dates(&dates, Calendar::Day360).unwrap();
        assert_eq!(units, "days since 1981-01-01");
        assert_eq!(offsets, [15.5, 45.0, 409.5]);
        assert_eq!(decode_offsets(&offsets, &units, Calendar::Day360).unwrap(), dates);
    }
}
