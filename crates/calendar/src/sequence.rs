//! Regular date sequences.

use crate::calendar::Calendar;
use crate::date::CalendarDate;

/// Generates `n` dates one month apart.
///
/// Each date is derived from `start` directly, so a start on the 31st
/// lands on the last day of shorter months without drifting.
pub fn monthly_sequence(calendar: Calendar, start: CalendarDate, n: usize) -> Vec<CalendarDate> {
    (0..n)
        .map(|i| start.add_months(calendar, i as i32))
        .collect()
}

/// Generates `n` consecutive days.
pub fn daily_sequence(calendar: Calendar, start: CalendarDate, n: usize) -> Vec<CalendarDate> {
    let mut dates = Vec::with_capacity(n);
    let mut ordinal = start.ordinal_days(calendar);
    for _ in 0..n {
        dates.push(CalendarDate::from_ordinal_days(calendar, ordinal));
        ordinal += 1.0;
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(cal: Calendar, y: i32, m: u8, d: u8) -> CalendarDate {
        CalendarDate::new(cal, y, m, d).unwrap()
    }

    #[test]
    fn empty() {
        let start = date(Calendar::Standard, 2000, 1, 1);
        assert!(monthly_sequence(Calendar::Standard, start, 0).is_empty());
        assert!(daily_sequence(Calendar::Standard, start, 0).is_empty());
    }

    #[test]
    fn monthly_crosses_year() {
        let start = date(Calendar::Standard, 1979, 11, 15);
        let dates = monthly_sequence(Calendar::Standard, start, 3);
        assert_eq!(dates[2], date(Calendar::Standard, 1980, 1, 15));
    }

    #[test]
    fn monthly_end_of_month_does_not_drift() {
        let start = date(Calendar::Standard, 2001, 1, 31);
        let dates = monthly_sequence(Calendar::Standard, start, 3);
        assert_eq!(dates[1].day(), 28);
        assert_eq!(dates[2].day(), 31);
    }

    #[test]
    fn daily_feb_28_to_mar_1_noleap() {
        let start = date(Calendar::NoLeap, 2000, 2, 27);
        let dates = daily_sequence(Calendar::NoLeap, start, 3);
        assert_eq!(dates[2], date(Calendar::NoLeap, 2000, 3, 1));
    }

    #[test]
    fn daily_leap_day_standard() {
        let start = date(Calendar::Standard, 2000, 2, 28);
        let dates = daily_sequence(Calendar::Standard, start, 2);
        assert_eq!(dates[1], date(Calendar::Standard, 2000, 2, 29));
    }
}
