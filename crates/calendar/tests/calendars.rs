use nino_calendar::{
    Calendar, CalendarDate, CalendarError, TimeBound, days_per_month, fractional_years,
    monthly_sequence,
};

const ALL: [Calendar; 6] = [
    Calendar::Standard,
    Calendar::ProlepticGregorian,
    Calendar::Julian,
    Calendar::NoLeap,
    Calendar::AllLeap,
    Calendar::Day360,
];

#[test]
fn monthly_weights_sum_to_year_length() {
    for cal in ALL {
        for year in [1500, 1900, 2000, 2023, 2024] {
            let start = CalendarDate::new(cal, year, 1, 1).unwrap();
            let dates = monthly_sequence(cal, start, 12);
            let total: f64 = days_per_month(&dates, cal).iter().sum();
            assert_eq!(
                total,
                f64::from(cal.days_in_year(year)),
                "{cal} year {year}"
            );
        }
    }
}

#[test]
fn february_weight_per_calendar() {
    let expected = [
        (Calendar::Standard, 1900, 28.0),
        (Calendar::Standard, 1500, 29.0),
        (Calendar::ProlepticGregorian, 1500, 28.0),
        (Calendar::Julian, 1900, 29.0),
        (Calendar::NoLeap, 2000, 28.0),
        (Calendar::AllLeap, 2001, 29.0),
        (Calendar::Day360, 2001, 30.0),
    ];
    for (cal, year, days) in expected {
        let feb = CalendarDate::new(cal, year, 2, 1).unwrap();
        assert_eq!(days_per_month(&[feb], cal), vec![days], "{cal} {year}");
    }
}

#[test]
fn ordinal_roundtrip_every_day_of_a_leap_year() {
    for cal in ALL {
        let mut date = CalendarDate::new(cal, 2000, 1, 1).unwrap();
        for _ in 0..cal.days_in_year(2000) {
            let back = CalendarDate::from_ordinal_days(cal, date.ordinal_days(cal));
            assert_eq!(back, date, "{cal}");
            date = date.add_days(cal, 1);
        }
        assert_eq!((date.year(), date.month(), date.day()), (2001, 1, 1), "{cal}");
    }
}

#[test]
fn fractional_year_starts_at_integer() {
    for cal in ALL {
        let jan1 = CalendarDate::new(cal, 1985, 1, 1).unwrap();
        assert_eq!(fractional_years(&[jan1], cal), vec![1985.0]);
    }
}

#[test]
fn bounds_filter_monthly_series() {
    let cal = Calendar::Standard;
    let start = CalendarDate::new(cal, 1979, 12, 1).unwrap();
    let dates = monthly_sequence(cal, start, 14 * 12);
    let lower = TimeBound::parse("1980-01-01").unwrap();
    let upper = TimeBound::parse("1990-12-31").unwrap();
    let kept: Vec<_> = dates
        .iter()
        .filter(|d| !lower.is_after(d) && !upper.is_before(d))
        .collect();
    assert_eq!(kept.len(), 11 * 12);
    assert_eq!(kept[0].to_string(), "1980-01-01");
    assert_eq!(kept[kept.len() - 1].to_string(), "1990-12-01");
}

#[test]
fn invalid_inputs() {
    assert_eq!(
        "julian_day".parse::<Calendar>().unwrap_err(),
        CalendarError::UnknownCalendar {
            name: "julian_day".to_string()
        }
    );
    assert!(matches!(
        CalendarDate::new(Calendar::Day360, 2000, 0, 1),
        Err(CalendarError::InvalidMonth { month: 0 })
    ));
    assert!(TimeBound::parse("not-a-date").is_err());
}
