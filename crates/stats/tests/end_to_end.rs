//! Detrend, anomalies and NDJ season mean on a synthetic ENSO-like series.

use approx::assert_abs_diff_eq;
use nino_calendar::{Calendar, CalendarDate, monthly_sequence};
use nino_grid::{AxisRef, Coordinate, LabeledArray};
use nino_stats::{Season, interannual_anomalies, remove_fit, season_mean};

const YEARS: usize = 45;

/// Sign of the event injected into the NDJ season starting in year `k`.
fn event(k: usize) -> f64 {
    if k % 2 == 0 { 1.0 } else { -1.0 }
}

fn synthetic() -> LabeledArray {
    let cal = Calendar::NoLeap;
    let start = CalendarDate::new(cal, 1979, 1, 15).unwrap();
    let dates = monthly_sequence(cal, start, YEARS * 12);
    let t0 = dates[0].ordinal_days(cal);
    let values: Vec<f64> = dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let (k, m) = (i / 12, i % 12);
            let mut v = 0.002 * (d.ordinal_days(cal) - t0) + 3.0 * (2.0 * std::f64::consts::PI * m as f64 / 12.0).sin();
            if (m == 10 || m == 11) && k < YEARS - 1 {
                v += event(k);
            }
            if m == 0 && k >= 1 {
                v += event(k - 1);
            }
            v
        })
        .collect();
    LabeledArray::series("sst", "time", values)
        .with_attr("units", "K")
        .with_coord("time", Coordinate::time("time", dates, cal))
        .unwrap()
}

#[test]
fn ndj_index_recovers_injected_events() {
    let sst = synthetic();
    let detrended = remove_fit(&sst, 1, &AxisRef::parse("T")).unwrap();
    let anomalies = interannual_anomalies(&detrended).unwrap();
    let ndj = season_mean(&anomalies, Season::Ndj, None).unwrap();

    assert_eq!(ndj.dims(), ["year"]);
    assert_eq!(ndj.shape(), [YEARS - 1]);
    let years = ndj.coord("year").unwrap().as_numeric().unwrap();
    assert_eq!(years[0], 1979.0);
    assert_eq!(years[YEARS - 2], 2022.0);
    for (k, v) in ndj.values().iter().enumerate() {
        assert_abs_diff_eq!(*v, event(k), epsilon = 0.1);
    }
}

#[test]
fn attributes_survive_the_chain() {
    let sst = synthetic();
    let detrended = remove_fit(&sst, 1, &AxisRef::parse("T")).unwrap();
    let anomalies = interannual_anomalies(&detrended).unwrap();
    assert_eq!(anomalies.name(), "sst");
    assert!(anomalies.attrs().contains_key("units"));
}
