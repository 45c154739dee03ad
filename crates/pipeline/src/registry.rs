//! Static table of known operators.

use serde::de::DeserializeOwned;

use crate::ops::{
    Average, AverageMoving, BoundsSelect, Detrend, InterannualAnomalies, Normalize, Operator, ReshapeLeadLag,
    SeasonMean, SeasonalCycle,
};

/// Parses an operator's settings table.
pub type Builder = fn(toml::Value) -> Result<Box<dyn Operator>, toml::de::Error>;

fn build<T: Operator + DeserializeOwned + 'static>(settings: toml::Value) -> Result<Box<dyn Operator>, toml::de::Error> {
    Ok(Box::new(settings.try_into::<T>()?))
}

/// Operator names and their builders, sorted by name.
pub static REGISTRY: &[(&str, Builder)] = &[
    ("average", build::<Average>),
    ("average_moving", build::<AverageMoving>),
    ("detrend", build::<Detrend>),
    ("interannual_anomalies", build::<InterannualAnomalies>),
    ("netcdf_selector", build::<BoundsSelect>),
    ("normalize", build::<Normalize>),
    ("reshape_lead_lag", build::<ReshapeLeadLag>),
    ("season_mean", build::<SeasonMean>),
    ("seasonal_cycle", build::<SeasonalCycle>),
];

/// Builder registered under `name`.
pub fn lookup(name: &str) -> Option<Builder> {
    REGISTRY.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
}

/// All registered operator names.
pub fn operator_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(n, _)| *n).collect()
}
