use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}

/// Name of a backend algorithm variant; doubles as the output file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScenarioName(String);

impl ScenarioName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScenarioName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let invalid = value.is_empty()
            || value == "."
            || value == ".."
            || value
                .chars()
                .any(|ch| ch.is_whitespace() || ch == '/' || ch == '\\' || ch.is_control());
        if invalid {
            return Err(ValidationError::InvalidScenarioName { value });
        }
        Ok(Self(value))
    }
}

impl std::str::FromStr for ScenarioName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.trim().to_owned())
    }
}

impl From<ScenarioName> for String {
    fn from(value: ScenarioName) -> Self {
        value.0
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Longitude/latitude rectangle used for coordinate sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl std::str::FromStr for BoundingBox {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [min_lon, min_lat, max_lon, max_lat] = parts.as_slice() else {
            return Err(ValidationError::InvalidBoundingBoxFormat {
                value: s.to_owned(),
            });
        };
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|err| ValidationError::InvalidBoundingBoxNumber {
                    value: value.to_owned(),
                    source: err,
                })
        };
        let bbox = BoundingBox {
            min_lon: parse(min_lon)?,
            min_lat: parse(min_lat)?,
            max_lon: parse(max_lon)?,
            max_lat: parse(max_lat)?,
        };
        let finite = [bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat]
            .iter()
            .all(|value| value.is_finite());
        if !finite || bbox.min_lon >= bbox.max_lon || bbox.min_lat >= bbox.max_lat {
            return Err(ValidationError::BoundingBoxInverted {
                value: s.to_owned(),
            });
        }
        Ok(bbox)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Detect from the CSV header.
    #[default]
    Auto,
    /// `path,parameters` rows.
    Requests,
    /// Legacy `Start, Target, Day, Hour, arrival` rows.
    Journeys,
}
