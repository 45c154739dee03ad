//! Seasonal cycle, anomalies, season extraction and normalisation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use nino_calendar::CalendarDate;
use nino_grid::{AxisRef, AxisTag, Coordinate, LabeledArray, OnMissing, require_axis};
use serde::Deserialize;
use tracing::debug;

use crate::error::StatsError;
use crate::rolling::moving_average;
use crate::series::nan_mean;
use crate::weighted::{Weights, std};

/// A 3-month season, named by the initials of its months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Season {
    Djf,
    Jfm,
    Fma,
    Mam,
    Amj,
    Mjj,
    Jja,
    Jas,
    Aso,
    Son,
    Ond,
    #[default]
    Ndj,
}

impl Season {
    pub const ALL: [Season; 12] = [
        Self::Djf,
        Self::Jfm,
        Self::Fma,
        Self::Mam,
        Self::Amj,
        Self::Mjj,
        Self::Jja,
        Self::Jas,
        Self::Aso,
        Self::Son,
        Self::Ond,
        Self::Ndj,
    ];

    /// Middle month of the season (1 = January).
    pub fn center_month(self) -> u8 {
        match self {
            Self::Djf => 1,
            Self::Jfm => 2,
            Self::Fma => 3,
            Self::Mam => 4,
            Self::Amj => 5,
            Self::Mjj => 6,
            Self::Jja => 7,
            Self::Jas => 8,
            Self::Aso => 9,
            Self::Son => 10,
            Self::Ond => 11,
            Self::Ndj => 12,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Djf => "DJF",
            Self::Jfm => "JFM",
            Self::Fma => "FMA",
            Self::Mam => "MAM",
            Self::Amj => "AMJ",
            Self::Mjj => "MJJ",
            Self::Jja => "JJA",
            Self::Jas => "JAS",
            Self::Aso => "ASO",
            Self::Son => "SON",
            Self::Ond => "OND",
            Self::Ndj => "NDJ",
        }
    }
}

impl FromStr for Season {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|season| season.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| StatsError::InvalidSeason { value: s.to_string() })
    }
}

impl TryFrom<String> for Season {
    type Error = StatsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn time_axis(da: &LabeledArray) -> Result<(String, Vec<CalendarDate>), StatsError> {
    let time = require_axis(da, &AxisRef::Tag(AxisTag::Time), OnMissing::Warn)?;
    let dates = da.time_coord(&time)?.0.to_vec();
    Ok((time, dates))
}

/// Time positions grouped by calendar month, in month order.
fn month_groups(dates: &[CalendarDate]) -> BTreeMap<u8, Vec<usize>> {
    let mut groups: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, d) in dates.iter().enumerate() {
        groups.entry(d.month()).or_default().push(i);
    }
    groups
}

fn group_means(lane: &[f64], groups: &BTreeMap<u8, Vec<usize>>) -> BTreeMap<u8, f64> {
    groups
        .iter()
        .map(|(&m, idx)| {
            let values: Vec<f64> = idx.iter().map(|&i| lane[i]).collect();
            (m, nan_mean(&values))
        })
        .collect()
}

/// Climatology: the mean of every calendar month.
///
/// The time axis is replaced by a `month` axis holding the months present
/// (1 = January), in ascending order.
///
/// # Errors
///
/// Returns the soft [`nino_grid::GridError::UnresolvedAxis`] without a
/// time axis, or [`nino_grid::GridError::NotTimeAxis`] if it carries no dates.
#[tracing::instrument(level = "debug", skip_all, fields(var = da.name()))]
pub fn seasonal_cycle(da: &LabeledArray) -> Result<LabeledArray, StatsError> {
    let (time, dates) = time_axis(da)?;
    let groups = month_groups(&dates);
    let months: Vec<f64> = groups.keys().map(|&m| f64::from(m)).collect();
    let values = da.apply_along(&time, groups.len(), |lane| group_means(lane, &groups).into_values().collect())?;
    Ok(da.replace_axis(
        &time,
        &["month".to_string()],
        values,
        vec![("month".to_string(), Coordinate::axis("month", months))],
    )?)
}

/// Interannual anomalies: every value minus the climatology of its month.
///
/// # Errors
///
/// Same as [`seasonal_cycle`].
#[tracing::instrument(level = "debug", skip_all, fields(var = da.name()))]
pub fn interannual_anomalies(da: &LabeledArray) -> Result<LabeledArray, StatsError> {
    let (time, dates) = time_axis(da)?;
    let groups = month_groups(&dates);
    let out = da.map_lanes(&time, |lane| {
        let means = group_means(lane, &groups);
        lane.iter()
            .zip(&dates)
            .map(|(&v, d)| v - means.get(&d.month()).copied().unwrap_or(f64::NAN))
            .collect()
    })?;
    Ok(out.remove_unused_coordinates())
}

/// Picks the steps whose month is the center of `season` and relabels time
/// as a `year` axis.
///
/// Expects data already smoothed with a 3-step moving average, so each kept
/// step stands for its whole season. Years are shifted by one for `DJF`.
/// The edge year whose season is incomplete is dropped: the first for
/// `DJF`, the last otherwise.
///
/// # Errors
///
/// Same as [`seasonal_cycle`], plus the soft
/// [`StatsError::InsufficientData`] when no step falls in the season.
#[tracing::instrument(level = "debug", skip(da), fields(var = da.name()))]
pub fn get_season(da: &LabeledArray, season: Season) -> Result<LabeledArray, StatsError> {
    let (time, dates) = time_axis(da)?;
    let center = season.center_month();
    let idx: Vec<usize> = (0..dates.len()).filter(|&i| dates[i].month() == center).collect();
    if idx.is_empty() {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    let shift = i32::from(season == Season::Djf);
    let years: Vec<f64> = idx.iter().map(|&i| f64::from(dates[i].year() + shift)).collect();
    let n = idx.len();
    let out = da
        .take(&time, &idx)?
        .rename_axis(&time, "year")?
        .with_coord("year", Coordinate::axis("year", years))?;
    let keep = if season == Season::Djf { 1..n } else { 0..n - 1 };
    debug!(%season, steps = n, kept = keep.len(), "season selected");
    Ok(out.slice_axis("year", keep)?)
}

/// Seasonal mean: a 3-step moving average along time followed by
/// [`get_season`].
///
/// # Errors
///
/// Propagates [`moving_average`] and [`get_season`] errors.
pub fn season_mean(da: &LabeledArray, season: Season, min_periods: Option<usize>) -> Result<LabeledArray, StatsError> {
    let smoothed = moving_average(da, &AxisRef::Tag(AxisTag::Time), 3, min_periods)?;
    Ok(get_season(&smoothed, season)?.remove_unused_coordinates())
}

/// Divides by the standard deviation along time (`n - ddof` denominator).
///
/// A `units` attribute, if present, is blanked.
///
/// # Errors
///
/// Returns the soft [`nino_grid::GridError::UnresolvedAxis`] without a
/// time axis.
#[tracing::instrument(level = "debug", skip(da), fields(var = da.name()))]
pub fn normalize(da: &LabeledArray, ddof: usize) -> Result<LabeledArray, StatsError> {
    let sd = std(da, &[AxisRef::Tag(AxisTag::Time)], &Weights::None, ddof, true)?;
    let out = da.zip_with(&sd, |v, s| v / s)?;
    if da.attrs().contains_key("units") {
        return Ok(out.with_attr("units", ""));
    }
    Ok(out)
}
