//! Semantic axis tags and their resolution to concrete axis names.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::GridError;

/// Semantic role of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisTag {
    Time,
    Longitude,
    Latitude,
}

impl AxisTag {
    /// Candidate literal names, in priority order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Time => &["time", "tim"],
            Self::Longitude => &["longitude", "lon", "x"],
            Self::Latitude => &["latitude", "lat", "y"],
        }
    }

    /// Short code used in configuration (`T`, `X`, `Y`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Time => "T",
            Self::Longitude => "X",
            Self::Latitude => "Y",
        }
    }

    /// Parses a short code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(Self::Time),
            "X" => Some(Self::Longitude),
            "Y" => Some(Self::Latitude),
            _ => None,
        }
    }
}

/// An axis as requested by a caller: a semantic tag or a literal name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisRef {
    Tag(AxisTag),
    Name(String),
}

impl AxisRef {
    /// Creates a reference from a configuration string; `T`/`X`/`Y` become tags.
    pub fn parse(s: &str) -> Self {
        AxisTag::from_code(s).map_or_else(|| Self::Name(s.to_string()), Self::Tag)
    }
}

impl From<AxisTag> for AxisRef {
    fn from(tag: AxisTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<&str> for AxisRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for AxisRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag.code()),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for AxisRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Anything exposing an ordered list of axis and coordinate names.
pub trait AxisSource {
    /// Axis and coordinate names, in listing order, without duplicates.
    fn axis_names(&self) -> Vec<String>;
}

/// Resolves `tag` to a concrete name in `source`.
///
/// Each candidate is tried in turn: first an exact match, then a prefix
/// match (single-character candidates) or a substring match (longer ones)
/// against the names in listing order. Returns `None` when nothing matches.
pub fn resolve<S: AxisSource + ?Sized>(source: &S, tag: AxisTag) -> Option<String> {
    let names = source.axis_names();
    for candidate in tag.candidates() {
        if let Some(name) = names.iter().find(|n| n.as_str() == *candidate) {
            return Some(name.clone());
        }
        let hit = if candidate.len() == 1 {
            names.iter().find(|n| n.starts_with(candidate))
        } else {
            names.iter().find(|n| n.contains(candidate))
        };
        if let Some(name) = hit {
            return Some(name.clone());
        }
    }
    None
}

/// What to do when a literal axis name is missing.
///
/// Read from configuration as `"fail"` or `"warn"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    /// Return [`GridError::MissingAxis`].
    Fail,
    /// Emit a warning and continue without the axis.
    #[default]
    Warn,
}

/// Resolves an [`AxisRef`] against `source`.
///
/// Tags are resolved leniently and yield `Ok(None)` when absent. A literal
/// name that does not exist is reported according to `on_missing`.
///
/// # Errors
///
/// Returns [`GridError::MissingAxis`] for a missing literal name when
/// `on_missing` is [`OnMissing::Fail`].
#[track_caller]
pub fn check_axis<S: AxisSource + ?Sized>(
    source: &S,
    axis: &AxisRef,
    on_missing: OnMissing,
) -> Result<Option<String>, GridError> {
    match axis {
        AxisRef::Tag(tag) => Ok(resolve(source, *tag)),
        AxisRef::Name(name) => {
            let names = source.axis_names();
            if names.iter().any(|n| n == name) {
                return Ok(Some(name.clone()));
            }
            match on_missing {
                OnMissing::Fail => Err(GridError::MissingAxis {
                    name: name.clone(),
                    available: names.join(", "),
                }),
                OnMissing::Warn => {
                    let caller = Location::caller();
                    warn!(
                        %caller,
                        axis = %name,
                        available = %names.join(", "),
                        "axis not found"
                    );
                    Ok(None)
                }
            }
        }
    }
}

/// Like [`check_axis`], but an absent axis becomes the soft
/// [`GridError::UnresolvedAxis`].
///
/// # Errors
///
/// Returns [`GridError::UnresolvedAxis`] if the axis is absent, or
/// [`GridError::MissingAxis`] as described for [`check_axis`].
#[track_caller]
pub fn require_axis<S: AxisSource + ?Sized>(
    source: &S,
    axis: &AxisRef,
    on_missing: OnMissing,
) -> Result<String, GridError> {
    check_axis(source, axis, on_missing)?.ok_or_else(|| GridError::unresolved(axis))
}
